//! Shared test helpers: tracing setup and a tiny integer expression
//! evaluator used to verify that encoded numeric expressions round-trip.

/// Initializes test-friendly tracing output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Evaluates an encoded integer expression: decimal and `0x` literals,
/// `+ - * | ^`, unary `~ - +`, and parentheses.
///
/// The coercion idioms `(+[])` and `(+!![])` are substituted textually
/// before parsing since they have no arithmetic grammar.
pub fn eval_int(expr: &str) -> i64 {
    let normalized = expr.replace("(+!![])", "1").replace("(+[])", "0");
    let mut parser = Parser {
        bytes: normalized.as_bytes(),
        pos: 0,
    };
    let value = parser.expr();
    parser.skip_ws();
    assert_eq!(
        parser.pos,
        parser.bytes.len(),
        "trailing input in expression: {expr}"
    );
    value
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> i64 {
        let mut acc = self.term();
        while let Some(op) = self.peek() {
            match op {
                b'+' => {
                    self.pos += 1;
                    acc += self.term();
                }
                b'-' => {
                    self.pos += 1;
                    acc -= self.term();
                }
                b'|' => {
                    self.pos += 1;
                    acc |= self.term();
                }
                b'^' => {
                    self.pos += 1;
                    acc ^= self.term();
                }
                _ => break,
            }
        }
        acc
    }

    fn term(&mut self) -> i64 {
        let mut acc = self.factor();
        while self.peek() == Some(b'*') {
            self.pos += 1;
            acc *= self.factor();
        }
        acc
    }

    fn factor(&mut self) -> i64 {
        match self.peek() {
            Some(b'~') => {
                self.pos += 1;
                !self.factor()
            }
            Some(b'-') => {
                self.pos += 1;
                -self.factor()
            }
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr();
                assert_eq!(self.peek(), Some(b')'), "expected closing paren");
                self.pos += 1;
                value
            }
            Some(c) if c.is_ascii_digit() => self.number(),
            other => panic!("unexpected token {other:?} at {}", self.pos),
        }
    }

    fn number(&mut self) -> i64 {
        self.skip_ws();
        let start = self.pos;
        if self.bytes[self.pos..].starts_with(b"0x") {
            self.pos += 2;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
            let hex = std::str::from_utf8(&self.bytes[start + 2..self.pos]).unwrap();
            return i64::from_str_radix(hex, 16).unwrap();
        }
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap()
            .parse()
            .unwrap()
    }
}
