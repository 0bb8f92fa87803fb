//! HTML token stream
//!
//! Wraps the `html5ever` tokenizer and flattens its output into the small set
//! of tokens the preview scanner needs: start, end and self-closing tags with
//! ordered attributes, and coalesced text. Comments, doctypes and parse errors
//! are dropped.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag as RawTag, TagKind, Token as RawToken, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use std::collections::VecDeque;

/// A tag with its lowercase name and attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

/// A token of the flattened stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(Tag),
    EndTag(Tag),
    SelfClosingTag(Tag),
    Text(String),
}

impl Token {
    /// The tag carried by the token, if it is not text
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Self::StartTag(tag) | Self::EndTag(tag) | Self::SelfClosingTag(tag) => Some(tag),
            Self::Text(_) => None,
        }
    }
}

/// Input fed to the tokenizer per step
const CHUNK_SIZE: usize = 4096;

/// Tokenizes a whole document
///
/// The tokenizer never fails: malformed markup is recovered from the way a
/// browser would, and the stream simply ends with the input.
///
/// # Example
///
/// ```
/// use sumi_lens::preview::tokenizer::{tokenize, Token};
///
/// let tokens = tokenize("<title>A &amp; B</title>");
/// assert_eq!(tokens[1], Token::Text("A & B".to_string()));
/// ```
pub fn tokenize(html: &str) -> Vec<Token> {
    TokenStream::new(html).collect()
}

/// Lazy token stream over a document
///
/// The input is handed to the tokenizer one chunk at a time, only when the
/// tokens already produced have been consumed. A consumer that stops early
/// leaves the rest of the document untokenized.
pub struct TokenStream<'a> {
    tokenizer: Tokenizer<Collector>,
    queue: BufferQueue,
    input: &'a str,
    offset: usize,
    ended: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokenizer: Tokenizer::new(Collector::default(), TokenizerOpts::default()),
            queue: BufferQueue::new(),
            input,
            offset: 0,
            ended: false,
        }
    }

    /// Feeds the next chunk, or ends the tokenizer once the input is spent
    fn advance(&mut self) {
        if self.offset < self.input.len() {
            let mut end = (self.offset + CHUNK_SIZE).min(self.input.len());
            while !self.input.is_char_boundary(end) {
                end += 1;
            }
            self.queue
                .push_back(StrTendril::from_slice(&self.input[self.offset..end]));
            self.offset = end;
            let _ = self.tokenizer.feed(&mut self.queue);
        } else {
            self.tokenizer.end();
            self.ended = true;
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.tokenizer.sink.tokens.pop_front() {
                return Some(token);
            }
            if self.ended {
                return None;
            }
            self.advance();
        }
    }
}

#[derive(Default)]
struct Collector {
    tokens: VecDeque<Token>,
    text: String,
}

impl Collector {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push_back(Token::Text(std::mem::take(&mut self.text)));
        }
    }
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&mut self, token: RawToken, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            RawToken::CharacterTokens(text) => self.text.push_str(&text),
            RawToken::TagToken(tag) => {
                self.flush_text();
                let switch = content_model(&tag);
                self.tokens.push_back(convert(tag));
                if let Some(result) = switch {
                    return result;
                }
            }
            RawToken::CommentToken(_) | RawToken::DoctypeToken(_) | RawToken::EOFToken => {
                self.flush_text()
            }
            RawToken::NullCharacterToken | RawToken::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }
}

/// Elements whose content is not markup
///
/// Without a tree builder the tokenizer has to be told to switch state, so
/// `<title>x<b>y</b></title>` stays a single text token.
fn content_model(tag: &RawTag) -> Option<TokenSinkResult<()>> {
    if tag.kind != TagKind::StartTag || tag.self_closing {
        return None;
    }
    let kind = match &*tag.name {
        "title" | "textarea" => RawKind::Rcdata,
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => RawKind::Rawtext,
        "script" => RawKind::ScriptData,
        "plaintext" => return Some(TokenSinkResult::Plaintext),
        _ => return None,
    };
    Some(TokenSinkResult::RawData(kind))
}

fn convert(tag: RawTag) -> Token {
    let converted = Tag {
        name: tag.name.to_string(),
        attrs: tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect(),
    };
    match (tag.kind, tag.self_closing) {
        (TagKind::StartTag, true) => Token::SelfClosingTag(converted),
        (TagKind::StartTag, false) => Token::StartTag(converted),
        (TagKind::EndTag, _) => Token::EndTag(converted),
    }
}
