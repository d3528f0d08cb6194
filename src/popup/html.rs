use std::borrow::Cow;

/// Escape text for use in HTML element content or a quoted attribute value.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Builds popup markup, escaping text unless the input is trusted.
pub(crate) struct HtmlWriter {
    buffer: String,
    trusted: bool,
}

impl HtmlWriter {
    pub(crate) fn new(trusted: bool) -> Self {
        Self { buffer: String::new(), trusted }
    }

    /// Append literal markup.
    pub(crate) fn raw(&mut self, markup: &str) -> &mut Self {
        self.buffer.push_str(markup);
        self
    }

    /// Append text content.
    pub(crate) fn text(&mut self, text: &str) -> &mut Self {
        if self.trusted { self.buffer.push_str(text) } else { self.buffer.push_str(&escape(text)) }
        self
    }

    /// Append `<tag>text</tag>`.
    pub(crate) fn element(&mut self, tag: &str, text: &str) -> &mut Self {
        self.raw("<").raw(tag).raw(">").text(text).raw("</").raw(tag).raw(">")
    }

    /// Append a `<tr>` of `cell` elements.
    pub(crate) fn table_row<'a>(&mut self, cell: &str, values: impl IntoIterator<Item = &'a str>) -> &mut Self {
        self.raw("<tr>");
        for value in values {
            self.element(cell, value);
        }
        self.raw("</tr>")
    }

    pub(crate) fn into_string(self) -> String { self.buffer }
}
