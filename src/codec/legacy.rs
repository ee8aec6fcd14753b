//! Reader for legacy address literals
//!
//! Older deployments stored the address as the textual form of a dictionary,
//! for example `{'str': 'Main', 'nr': 5, 'bl': None}`; later ones stored a
//! JSON object with every non-ASCII character escaped. This module parses both
//! without evaluating anything: quoted strings (optionally `u`-prefixed) with
//! the JSON and Python escapes, including `\U` and surrogate pairs, numbers,
//! `None`/`null` and booleans. Keys are mapped onto [`Address`] fields through
//! a fixed alias table; unknown keys are ignored.

use crate::domain::errors::LegacyAddressError;
use crate::domain::Address;

/// Parse a legacy dictionary literal into an address
pub fn parse_legacy_address(text: &str) -> Result<Address, LegacyAddressError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();

    match parser.peek() {
        Some('{') => {}
        Some('\'' | '"' | '[' | '(' | '-' | '0'..='9') => return Err(LegacyAddressError::NotAMapping),
        Some(_) if parser.at_keyword() => return Err(LegacyAddressError::NotAMapping),
        _ => return Err(parser.error("expected '{'")),
    }

    let entries = parser.parse_mapping()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing characters"));
    }

    let mut address = Address::default();
    for (key, value) in entries {
        assign(&mut address, &key, value);
    }
    Ok(address)
}

fn assign(address: &mut Address, key: &str, value: String) {
    let slot = match key {
        "str" | "street_name" => &mut address.street_name,
        "nr" | "street_number" => &mut address.street_number,
        "bl" | "street_bl" | "building" => &mut address.building,
        "sc" | "street_sc" | "entrance" => &mut address.entrance,
        "et" | "street_et" | "floor" => &mut address.floor,
        "ap" | "street_ap" | "apartment" => &mut address.apartment,
        _ => return,
    };
    *slot = value;
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: &str) -> LegacyAddressError {
        LegacyAddressError::Syntax {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LegacyAddressError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    fn at_keyword(&self) -> bool {
        ["None", "null", "True", "False", "true", "false"]
            .iter()
            .any(|kw| self.lookahead(kw))
    }

    fn lookahead(&self, word: &str) -> bool {
        let mut idx = self.pos;
        for expected in word.chars() {
            if self.chars.get(idx) != Some(&expected) {
                return false;
            }
            idx += 1;
        }
        !self
            .chars
            .get(idx)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
    }

    fn parse_mapping(&mut self) -> Result<Vec<(String, String)>, LegacyAddressError> {
        self.expect('{')?;
        let mut entries = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(entries);
            }

            let key = if self.at_string() {
                self.parse_string()?
            } else {
                return Err(self.error("expected a quoted key"));
            };
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            entries.push((key, value));

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    return Ok(entries);
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    /// A quote, or a `u`/`U` string prefix followed by one
    fn at_string(&self) -> bool {
        match self.peek() {
            Some('\'' | '"') => true,
            Some('u' | 'U') => matches!(self.chars.get(self.pos + 1), Some('\'' | '"')),
            _ => false,
        }
    }

    fn parse_value(&mut self) -> Result<String, LegacyAddressError> {
        if self.at_string() {
            return self.parse_string();
        }
        if self.peek().is_some_and(|c| c == '-' || c.is_ascii_digit()) {
            return Ok(self.parse_number());
        }

        for (word, value) in [
            ("None", ""),
            ("null", ""),
            ("True", "True"),
            ("true", "True"),
            ("False", "False"),
            ("false", "False"),
        ] {
            if self.lookahead(word) {
                self.pos += word.len();
                return Ok(value.to_string());
            }
        }

        Err(self.error("expected a string, number, boolean or None"))
    }

    fn parse_number(&mut self) -> String {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_string(&mut self) -> Result<String, LegacyAddressError> {
        if matches!(self.peek(), Some('u' | 'U')) {
            self.pos += 1;
        }
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quote")),
        };
        let mut out = String::new();

        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, LegacyAddressError> {
        match self.bump() {
            Some('\\') => Ok('\\'),
            Some('\'') => Ok('\''),
            Some('"') => Ok('"'),
            Some('/') => Ok('/'),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('a') => Ok('\u{7}'),
            Some('v') => Ok('\u{b}'),
            Some('x') => self.hex_char(2),
            Some('U') => self.hex_char(8),
            Some('u') => self.parse_utf16_escape(),
            _ => Err(self.error("invalid escape sequence")),
        }
    }

    /// `\uXXXX`, joining a high surrogate with a following `\uXXXX` low surrogate
    fn parse_utf16_escape(&mut self) -> Result<char, LegacyAddressError> {
        let high = self.read_hex(4)?;
        if !(0xD800..=0xDBFF).contains(&high) {
            return self.code_point(high);
        }

        if self.lookahead_raw("\\u") {
            let resume = self.pos;
            self.pos += 2;
            let low = self.read_hex(4)?;
            if (0xDC00..=0xDFFF).contains(&low) {
                return self.code_point(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
            }
            self.pos = resume;
        }

        Err(self.error("unpaired surrogate in escape sequence"))
    }

    fn lookahead_raw(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, c)| self.chars.get(self.pos + offset) == Some(&c))
    }

    fn hex_char(&mut self, digits: usize) -> Result<char, LegacyAddressError> {
        let code = self.read_hex(digits)?;
        self.code_point(code)
    }

    fn read_hex(&mut self, digits: usize) -> Result<u32, LegacyAddressError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.error("invalid hex escape"));
        }
        let code =
            u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;
        Ok(code)
    }

    fn code_point(&self, code: u32) -> Result<char, LegacyAddressError> {
        char::from_u32(code).ok_or_else(|| self.error("escape is not a valid character"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_short_keys() {
        let address = parse_legacy_address(
            "{'str': 'Strada Lunga', 'nr': '12', 'bl': 'B4', 'sc': '2', 'et': '3', 'ap': '14'}",
        )
        .unwrap();
        assert_eq!(
            address,
            Address::new("Strada Lunga", "12")
                .with_building("B4")
                .with_entrance("2")
                .with_floor("3")
                .with_apartment("14")
        );
    }

    #[test]
    fn test_long_keys_json() {
        let address = parse_legacy_address(
            r#"{"street_name": "Main", "street_number": "5", "street_bl": "A", "street_sc": "", "street_et": "1", "street_ap": "7"}"#,
        )
        .unwrap();
        assert_eq!(
            address,
            Address::new("Main", "5")
                .with_building("A")
                .with_floor("1")
                .with_apartment("7")
        );
    }

    #[test]
    fn test_missing_keys_become_empty() {
        let address = parse_legacy_address("{'str': 'Main'}").unwrap();
        assert_eq!(address, Address::new("Main", ""));
    }

    #[test]
    fn test_none_and_numbers() {
        let address = parse_legacy_address("{'str': 'Main', 'nr': 5, 'ap': None}").unwrap();
        assert_eq!(address.street_number, "5");
        assert_eq!(address.apartment, "");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let address = parse_legacy_address("{'str': 'Main', 'zip': '010101'}").unwrap();
        assert_eq!(address, Address::new("Main", ""));
    }

    #[test]
    fn test_empty_mapping() {
        assert!(parse_legacy_address("{}").unwrap().is_blank());
    }

    #[test]
    fn test_escapes() {
        let address = parse_legacy_address(r#"{'str': 'Calea Victoriei\'s \xe9'}"#).unwrap();
        assert_eq!(address.street_name, "Calea Victoriei's \u{e9}");
    }

    #[test]
    fn test_double_quoted_with_apostrophe() {
        let address = parse_legacy_address(r#"{'str': "O'Brien"}"#).unwrap();
        assert_eq!(address.street_name, "O'Brien");
    }

    #[test]
    fn test_trailing_comma() {
        assert!(parse_legacy_address("{'str': 'Main',}").is_ok());
    }

    #[test_case(r#"{"str": "Str\u0219oseaua"}"#, "Str\u{219}oseaua" ; "bmp diacritic")]
    #[test_case(r#"{"str": "Bloc \ud83d\ude00"}"#, "Bloc \u{1F600}" ; "surrogate pair")]
    #[test_case(r"{'str': 'Bloc \U0001F600'}", "Bloc \u{1F600}" ; "eight digit escape")]
    #[test_case(r"{'str': 'a\bb\fc'}", "a\u{8}b\u{c}c" ; "backspace and form feed")]
    #[test_case(r"{'str': 'Z\u00fcrich'}", "Z\u{fc}rich" ; "escape in single quotes")]
    fn test_unicode_escapes(input: &str, expected: &str) {
        let address = parse_legacy_address(input).unwrap();
        assert_eq!(address.street_name, expected);
    }

    #[test_case(r#"{"str": "\ud83d"}"# ; "lone high surrogate")]
    #[test_case(r#"{"str": "\ude00"}"# ; "lone low surrogate")]
    #[test_case(r#"{"str": "\ud83dA"}"# ; "high surrogate without low")]
    #[test_case(r"{'str': '\u12'}" ; "truncated escape")]
    #[test_case(r"{'str': '\x+1'}" ; "signed hex escape")]
    fn test_invalid_unicode_escapes(input: &str) {
        assert!(matches!(
            parse_legacy_address(input),
            Err(LegacyAddressError::Syntax { .. })
        ));
    }

    #[test]
    fn test_unicode_prefixed_strings() {
        let address = parse_legacy_address("{u'str': u'Main', U'nr': u\"7\"}").unwrap();
        assert_eq!(address, Address::new("Main", "7"));
    }

    #[test_case("{'str': 'Main', 'bl': True}", "True" ; "python true")]
    #[test_case("{'str': 'Main', 'bl': False}", "False" ; "python false")]
    #[test_case(r#"{"str": "Main", "bl": true}"#, "True" ; "json true")]
    fn test_booleans_are_stringified(input: &str, expected: &str) {
        let address = parse_legacy_address(input).unwrap();
        assert_eq!(address.building, expected);
    }

    #[test_case("'Main street'" ; "string literal")]
    #[test_case("42" ; "number")]
    #[test_case("['a', 'b']" ; "list")]
    #[test_case("None" ; "none")]
    fn test_not_a_mapping(input: &str) {
        assert_eq!(
            parse_legacy_address(input),
            Err(LegacyAddressError::NotAMapping)
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("not an address" ; "prose")]
    #[test_case("{'str': 'Main'" ; "unterminated mapping")]
    #[test_case("{'str' 'Main'}" ; "missing colon")]
    #[test_case("{'str': 'Main}" ; "unterminated string")]
    #[test_case("{'str': open('x')}" ; "call expression")]
    #[test_case("{'str': 'a'} extra" ; "trailing garbage")]
    fn test_syntax_errors(input: &str) {
        assert!(matches!(
            parse_legacy_address(input),
            Err(LegacyAddressError::Syntax { .. })
        ));
    }
}
