//! Byte cursor shared by the textual rule parsers.
//!
//! Rule strings are ASCII once normalized, so the scanner works on bytes and
//! reports characters back only when building errors.

use super::error::RuleError;

pub(crate) struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, context: &'static str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            context,
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, b: u8) -> Result<(), RuleError> {
        if self.eat(b) { Ok(()) } else { Err(self.unexpected()) }
    }

    pub fn at_digit(&self) -> bool {
        self.peek().is_some_and(|b| b.is_ascii_digit())
    }

    /// Parse an unsigned decimal number at the cursor.
    pub fn number(&mut self) -> Result<u32, RuleError> {
        if !self.at_digit() {
            return Err(RuleError::MissingNumber {
                context: self.context,
            });
        }
        let mut value: u64 = 0;
        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            value = value * 10 + u64::from(b - b'0');
            if value > u64::from(u32::MAX) {
                return Err(RuleError::out_of_range(
                    self.context,
                    i64::from(u32::MAX),
                    0,
                    i64::from(u32::MAX),
                ));
            }
            self.pos += 1;
        }
        Ok(value as u32)
    }

    /// Parse an optionally signed decimal number.
    pub fn signed(&mut self) -> Result<i64, RuleError> {
        let negative = if self.eat(b'-') {
            true
        } else {
            self.eat(b'+');
            false
        };
        let value = i64::from(self.number()?);
        Ok(if negative { -value } else { value })
    }

    pub fn rest(&self) -> &'a str {
        // The scanner only advances over ASCII bytes.
        std::str::from_utf8(&self.bytes[self.pos..]).unwrap_or_default()
    }

    pub fn finish(&self) -> Result<(), RuleError> {
        if self.is_done() { Ok(()) } else { Err(self.unexpected()) }
    }

    pub fn unexpected(&self) -> RuleError {
        match self.rest().chars().next() {
            Some(found) => RuleError::UnexpectedChar {
                found,
                context: self.context,
            },
            None => RuleError::UnexpectedEnd {
                context: self.context,
            },
        }
    }
}
