//! Argument templates with positional placeholders.
//!
//! Each template token is parsed once into literal and placeholder segments.
//! `%s` and `%v` mark a placeholder and `%%` is a literal percent sign; any
//! other `%` is kept as written. Rendering walks the segments and pulls
//! arguments from a [`Substitution`] cursor, so a placeholder can sit inside
//! a larger token and several templates can share one pass over the
//! arguments.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    raw: String,
    segments: Vec<Segment>,
}

impl Token {
    fn parse(raw: String) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            match chars.peek() {
                Some('s' | 'v') => {
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder);
                }
                Some('%') => {
                    chars.next();
                    literal.push('%');
                }
                _ => literal.push('%'),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { raw, segments }
    }

    fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder))
            .count()
    }

    fn render_with<'s>(&self, mut next: impl FnMut() -> Option<&'s str>) -> Option<String> {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder => rendered.push_str(next()?),
            }
        }
        Some(rendered)
    }
}

/// Cursor over runtime arguments, consumed left to right by one or more
/// templates.
pub struct Substitution<'a, S> {
    arguments: &'a [S],
    position: usize,
}

impl<'a, S: AsRef<str>> Substitution<'a, S> {
    pub fn new(arguments: &'a [S]) -> Self {
        Self {
            arguments,
            position: 0,
        }
    }

    fn next_argument(&mut self) -> Option<&'a str> {
        let argument = self.arguments.get(self.position)?;
        self.position += 1;
        Some(argument.as_ref())
    }

    /// Number of arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.arguments.len() - self.position
    }
}

/// The argument list of a command, parsed into placeholder-aware tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgsTemplate {
    tokens: Vec<Token>,
}

impl ArgsTemplate {
    pub fn parse(raw: Vec<String>) -> Self {
        Self {
            tokens: raw.into_iter().map(Token::parse).collect(),
        }
    }

    /// The tokens exactly as they were written.
    pub fn raw(&self) -> Vec<String> {
        self.tokens.iter().map(|token| token.raw.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn placeholder_count(&self) -> usize {
        self.tokens.iter().map(Token::placeholder_count).sum()
    }

    /// Position of the first token that contains a placeholder.
    pub fn loop_position(&self) -> Option<usize> {
        self.tokens
            .iter()
            .position(|token| token.placeholder_count() > 0)
    }

    /// Renders every token, taking one argument per placeholder from
    /// `substitution`. Returns `None` if the arguments run out.
    pub fn render<S: AsRef<str>>(&self, substitution: &mut Substitution<'_, S>) -> Option<Vec<String>> {
        self.tokens
            .iter()
            .map(|token| token.render_with(|| substitution.next_argument()))
            .collect()
    }

    /// Expands the first placeholder token into one token per argument.
    ///
    /// Every placeholder in that token receives the same argument. Tokens
    /// without placeholders are rendered in place, so `%%` still becomes `%`.
    /// Later placeholder tokens are kept exactly as written.
    pub fn render_loop<S: AsRef<str>>(&self, arguments: &[S]) -> Vec<String> {
        let Some(position) = self.loop_position() else {
            return self.raw();
        };

        let mut rendered = Vec::with_capacity(self.tokens.len() + arguments.len());
        for (index, token) in self.tokens.iter().enumerate() {
            if index != position {
                let literal = token.render_with(|| None);
                rendered.push(literal.unwrap_or_else(|| token.raw.clone()));
                continue;
            }

            for argument in arguments {
                if let Some(expanded) = token.render_with(|| Some(argument.as_ref())) {
                    rendered.push(expanded);
                }
            }
        }

        rendered
    }
}
