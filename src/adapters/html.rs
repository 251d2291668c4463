#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub struct HtmlTokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text_end: Option<String>,
}

impl<'a> HtmlTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(0), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes bytes until one matches `stop` (not consumed) or input ends.
    fn take_until(&mut self, stop: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek(0) {
            if stop(b) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn raw_text(&mut self, element: &str) -> Option<HtmlToken> {
        let closing = format!("</{}", element);
        let end = find_ignore_ascii_case(self.bytes(), self.pos, closing.as_bytes())
            .unwrap_or(self.input.len());
        let text = &self.input[self.pos..end];
        self.pos = end;
        (!text.is_empty()).then(|| HtmlToken::Text(text.to_string()))
    }

    fn comment(&mut self) -> HtmlToken {
        let body_start = self.pos + 4;
        match self.input[body_start..].find("-->") {
            Some(offset) => {
                let body = &self.input[body_start..body_start + offset];
                self.pos = body_start + offset + 3;
                HtmlToken::Comment(body.to_string())
            }
            None => {
                let body = &self.input[body_start..];
                self.pos = self.input.len();
                HtmlToken::Comment(body.to_string())
            }
        }
    }

    fn doctype(&mut self) -> HtmlToken {
        self.pos += 2;
        let body = self.take_until(|b| b == b'>');
        self.pos = (self.pos + 1).min(self.input.len());
        HtmlToken::Doctype(body.trim().to_string())
    }

    fn end_tag(&mut self) -> HtmlToken {
        self.pos += 2;
        let name = self
            .take_until(|b| b.is_ascii_whitespace() || b == b'>')
            .to_ascii_lowercase();
        self.take_until(|b| b == b'>');
        self.pos = (self.pos + 1).min(self.input.len());
        HtmlToken::EndTag { name }
    }

    fn start_tag(&mut self) -> HtmlToken {
        self.pos += 1;
        let name = self
            .take_until(|b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
            .to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek(0) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek(0) == Some(b'>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let attr_name = self
                        .take_until(|b| {
                            b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
                        })
                        .to_ascii_lowercase();
                    self.skip_whitespace();
                    let value = if self.peek(0) == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attribute_value()
                    } else {
                        String::new()
                    };
                    if !attr_name.is_empty() && !attributes.iter().any(|(n, _)| *n == attr_name) {
                        attributes.push((attr_name, value));
                    }
                }
            }
        }

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text_end = Some(name.clone());
        }

        HtmlToken::StartTag {
            name,
            attributes,
            self_closing,
        }
    }

    fn attribute_value(&mut self) -> String {
        match self.peek(0) {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let value = self.take_until(|b| b == quote);
                self.pos = (self.pos + 1).min(self.input.len());
                value.to_string()
            }
            _ => self
                .take_until(|b| b.is_ascii_whitespace() || b == b'>')
                .to_string(),
        }
    }

    fn text(&mut self) -> HtmlToken {
        let start = self.pos;
        let first_len = self.rest().chars().next().map_or(1, char::len_utf8);
        let mut end = self.input.len();
        let mut cursor = self.pos + first_len;
        while let Some(offset) = self.input[cursor..].find('<') {
            let candidate = cursor + offset;
            if starts_markup(&self.input[candidate..]) {
                end = candidate;
                break;
            }
            cursor = candidate + 1;
        }
        self.pos = end;
        HtmlToken::Text(self.input[start..end].to_string())
    }
}

fn starts_markup(s: &str) -> bool {
    let b = s.as_bytes();
    match (b.first(), b.get(1), b.get(2)) {
        (Some(b'<'), Some(b'!'), _) => true,
        (Some(b'<'), Some(b'/'), Some(c)) => c.is_ascii_alphabetic(),
        (Some(b'<'), Some(c), _) => c.is_ascii_alphabetic(),
        _ => false,
    }
}

fn find_ignore_ascii_case(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

impl Iterator for HtmlTokenizer<'_> {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.input.len() {
                return None;
            }

            if let Some(element) = self.raw_text_end.take() {
                match self.raw_text(&element) {
                    Some(token) => return Some(token),
                    None => continue,
                }
            }

            let rest = self.rest();
            if rest.starts_with("<!--") {
                return Some(self.comment());
            }
            if rest.starts_with("<!") {
                return Some(self.doctype());
            }
            if starts_markup(rest) {
                if rest.as_bytes()[1] == b'/' {
                    return Some(self.end_tag());
                }
                return Some(self.start_tag());
            }
            return Some(self.text());
        }
    }
}
