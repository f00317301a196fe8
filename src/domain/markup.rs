//! Markdown to Jira wiki markup conversion.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Converts a markdown body into Jira wiki markup.
pub fn to_jira_markup(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = MarkupWriter::default();
    for event in Parser::new_ext(markdown, options) {
        writer.handle(event);
    }
    writer.finish()
}

#[derive(Default)]
struct MarkupWriter {
    out: String,
    lists: Vec<ListKind>,
    item_start: bool,
    in_code_block: bool,
    in_table_head: bool,
    quote_start: bool,
    links: Vec<String>,
    image_depth: usize,
}

#[derive(Clone, Copy)]
enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    fn marker(self) -> char {
        match self {
            ListKind::Bullet => '*',
            ListKind::Ordered => '#',
        }
    }
}

impl MarkupWriter {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.push("{{");
                self.push(&code);
                self.push("}}");
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push(&html),
            Event::SoftBreak => self.push("\n"),
            Event::HardBreak => self.push("\\\\\n"),
            Event::Rule => {
                self.block_break();
                self.push("----");
            }
            Event::TaskListMarker(checked) => {
                self.push(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.block_break();
                } else if !self.item_start {
                    self.ensure_newline();
                }
            }
            Tag::Heading { level, .. } => {
                self.block_break();
                let depth = level as u8;
                self.push(&format!("h{depth}. "));
            }
            Tag::BlockQuote { .. } => {
                self.block_break();
                self.push("{quote}\n");
                self.quote_start = true;
            }
            Tag::CodeBlock(kind) => {
                self.block_break();
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        let lang = lang.split_whitespace().next().unwrap_or_default();
                        self.push(&format!("{{code:{lang}}}\n"));
                    }
                    _ => self.push("{code}\n"),
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_break();
                } else {
                    self.ensure_newline();
                }
                self.lists.push(match start {
                    Some(_) => ListKind::Ordered,
                    None => ListKind::Bullet,
                });
            }
            Tag::Item => {
                self.ensure_newline();
                let markers: String = self.lists.iter().map(|kind| kind.marker()).collect();
                self.push(&markers);
                self.push(" ");
                self.item_start = true;
            }
            Tag::Table(_) => self.block_break(),
            Tag::TableHead => self.in_table_head = true,
            Tag::TableCell => self.push(if self.in_table_head { "||" } else { "|" }),
            Tag::Emphasis => self.push("_"),
            Tag::Strong => self.push("*"),
            Tag::Strikethrough => self.push("-"),
            Tag::Link { dest_url, .. } => {
                self.push("[");
                self.links.push(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.push("!");
                self.push(&dest_url);
                self.push("!");
                self.image_depth += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::BlockQuote { .. } => {
                self.ensure_newline();
                self.push("{quote}");
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.ensure_newline();
                self.push("{code}");
            }
            TagEnd::List { .. } => {
                self.lists.pop();
                self.ensure_newline();
            }
            TagEnd::Item => self.ensure_newline(),
            TagEnd::TableHead => {
                self.push("||\n");
                self.in_table_head = false;
            }
            TagEnd::TableRow => self.push("|\n"),
            TagEnd::Emphasis => self.push("_"),
            TagEnd::Strong => self.push("*"),
            TagEnd::Strikethrough => self.push("-"),
            TagEnd::Link => {
                if let Some(url) = self.links.pop() {
                    self.push("|");
                    self.push(&url);
                }
                self.push("]");
            }
            TagEnd::Image => self.image_depth = self.image_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Alt text has no place in Jira image markup.
        if self.image_depth > 0 {
            return;
        }
        if self.in_code_block {
            self.out.push_str(text);
            return;
        }
        self.push(text);
    }

    fn push(&mut self, text: &str) {
        if self.image_depth > 0 {
            return;
        }
        if !text.is_empty() {
            self.item_start = false;
        }
        self.out.push_str(text);
    }

    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Separates top-level blocks with one blank line.
    fn block_break(&mut self) {
        if std::mem::take(&mut self.quote_start) || self.out.is_empty() {
            return;
        }
        if self.lists.is_empty() {
            self.ensure_newline();
            if !self.out.ends_with("\n\n") {
                self.out.push('\n');
            }
        } else {
            self.ensure_newline();
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}
