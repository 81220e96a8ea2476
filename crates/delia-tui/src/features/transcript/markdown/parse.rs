use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use super::highlight::highlight_code;
use super::wrap::{WrapOptions, wrap_styled_spans};
use crate::common::sanitize_for_display;
use crate::features::transcript::{Style, StyledLine, StyledSpan};

/// A fenced or indented code block found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string of a fenced block, if any.
    pub language: Option<String>,
    /// Exact code as written, minus the final newline.
    pub code: String,
    /// Index into [`MarkdownDocument::lines`] of the block's header line.
    pub header_line: usize,
}

/// Rendered Markdown: styled lines plus the code blocks they contain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownDocument {
    pub lines: Vec<StyledLine>,
    pub code_blocks: Vec<CodeBlock>,
}

/// Renders Markdown into styled lines wrapped at `width`.
///
/// Raw HTML is dropped. Tables go through comfy-table. Code blocks are never
/// wrapped; their body is syntax highlighted when the language is known.
pub fn render_markdown(text: &str, width: usize) -> MarkdownDocument {
    if text.is_empty() {
        return MarkdownDocument {
            lines: vec![StyledLine::empty()],
            code_blocks: vec![],
        };
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = MarkdownRenderer::new(width);
    for event in Parser::new_ext(text, options) {
        renderer.process_event(event);
    }
    renderer.finish()
}

#[derive(Debug, Default)]
struct TableBuffer {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

impl TableBuffer {
    fn finish_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        self.row.push(cell.trim().to_string());
    }

    fn finish_row(&mut self, is_header: bool) {
        let row = std::mem::take(&mut self.row);
        if is_header {
            self.header = row;
        } else {
            self.rows.push(row);
        }
    }

    fn render(&self, max_width: usize) -> Vec<String> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(u16::try_from(max_width).unwrap_or(u16::MAX));
        if !self.header.is_empty() {
            table.set_header(&self.header);
        }
        for row in &self.rows {
            table.add_row(row);
        }
        table.to_string().lines().map(String::from).collect()
    }
}

#[derive(Debug, Clone)]
struct ListState {
    ordered: bool,
    next_number: u64,
    /// The current item already emitted its marker line.
    marker_emitted: bool,
}

struct MarkdownRenderer {
    width: usize,
    lines: Vec<StyledLine>,
    code_blocks: Vec<CodeBlock>,
    spans: Vec<StyledSpan>,
    style_stack: Vec<Style>,
    code_block: Option<PendingCode>,
    list_stack: Vec<ListState>,
    blockquote_depth: usize,
    table: Option<TableBuffer>,
    in_table_head: bool,
}

struct PendingCode {
    language: Option<String>,
    text: String,
}

impl MarkdownRenderer {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            code_blocks: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![Style::Assistant],
            code_block: None,
            list_stack: Vec::new(),
            blockquote_depth: 0,
            table: None,
            in_table_head: false,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or(Style::Assistant)
    }

    fn push_style(&mut self, style: Style) {
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(StyledLine::empty());
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.add_inline_code(&code),
            Event::SoftBreak => self.add_break(" "),
            Event::HardBreak => self.add_break("\n"),
            // Raw HTML never reaches the terminal.
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.spans.push(StyledSpan::new(marker, Style::ListBullet));
            }
            Event::Rule => {
                self.flush_text();
                self.lines
                    .push(StyledLine::plain("─".repeat(self.width.clamp(1, 40)), Style::Rule));
                self.lines.push(StyledLine::empty());
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_text();
                self.push_style(heading_style(level));
            }
            Tag::CodeBlock(kind) => {
                self.flush_text();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(ToString::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some(PendingCode {
                    language,
                    text: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_text();
                self.list_stack.push(ListState {
                    ordered: start.is_some(),
                    next_number: start.unwrap_or(1),
                    marker_emitted: false,
                });
            }
            Tag::Item => {
                self.flush_text();
                if let Some(list) = self.list_stack.last_mut() {
                    list.marker_emitted = false;
                }
                self.push_style(Style::ListItem);
            }
            Tag::BlockQuote(_) => {
                self.flush_text();
                self.blockquote_depth += 1;
                self.push_style(Style::BlockQuote);
            }
            Tag::Emphasis => self.push_style(Style::Emphasis),
            Tag::Strong => self.push_style(Style::Strong),
            Tag::Link { .. } => self.push_style(Style::Link),
            Tag::Strikethrough | Tag::Superscript | Tag::Subscript => {
                let style = self.current_style();
                self.push_style(style);
            }
            Tag::Table(_) => {
                self.flush_text();
                self.table = Some(TableBuffer::default());
            }
            Tag::TableHead => self.in_table_head = true,
            Tag::Paragraph
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Image { .. }
            | Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::HtmlBlock
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_text();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_text();
                self.pop_style();
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                self.flush_code_block();
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_text();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_text();
                self.pop_style();
                if let Some(list) = self.list_stack.last_mut() {
                    list.next_number += 1;
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_text();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                self.pop_style();
                self.blank_line();
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Link
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => self.pop_style(),
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.render(self.width) {
                        self.lines.push(StyledLine::plain(line, Style::Plain));
                    }
                }
                self.blank_line();
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    // The header row has no TableRow wrapper.
                    table.finish_row(true);
                }
                self.in_table_head = false;
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table
                    && !self.in_table_head
                {
                    table.finish_row(false);
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    table.finish_cell();
                }
            }
            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(code) = &mut self.code_block {
            code.text.push_str(text);
            return;
        }
        if let Some(table) = &mut self.table {
            table.cell.push_str(&text.replace('\n', " "));
            return;
        }
        let style = self.current_style();
        self.spans.push(StyledSpan::new(text, style));
    }

    fn add_inline_code(&mut self, code: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push_str(&code.replace('\n', " "));
            return;
        }
        self.spans.push(StyledSpan::new(code, Style::CodeInline));
    }

    fn add_break(&mut self, text: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push(' ');
            return;
        }
        let style = self.current_style();
        self.spans.push(StyledSpan::new(text, style));
    }

    /// Wraps pending inline spans as a paragraph, list item or quote.
    fn flush_text(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);

        let quote = if self.blockquote_depth > 0 {
            "│ ".repeat(self.blockquote_depth)
        } else {
            String::new()
        };

        let depth = self.list_stack.len();
        let opts = match self.list_stack.last_mut() {
            Some(list) => {
                // Later paragraphs of a loose item hang under the first one.
                let first = !std::mem::replace(&mut list.marker_emitted, true);
                list_wrap_options(self.width, quote, depth, list, first)
            }
            None => {
                let prefix = if quote.is_empty() {
                    vec![]
                } else {
                    vec![StyledSpan::new(quote, Style::BlockQuote)]
                };
                WrapOptions::with_prefixes(self.width, prefix.clone(), prefix)
            }
        };

        let wrapped = wrap_styled_spans(&spans, &opts);
        self.lines.extend(wrapped);
    }

    fn flush_code_block(&mut self) {
        let Some(pending) = self.code_block.take() else {
            return;
        };
        let code = pending
            .text
            .strip_suffix('\n')
            .unwrap_or(&pending.text)
            .to_string();

        let header_line = self.lines.len();
        let header = match &pending.language {
            Some(lang) => format!("```{lang}"),
            None => "```".to_string(),
        };
        self.lines.push(StyledLine::plain(header, Style::CodeFence));

        if !code.is_empty() {
            let highlighted = pending
                .language
                .as_deref()
                .and_then(|lang| highlight_code(&code, lang));
            match highlighted {
                Some(lines) => {
                    for spans in lines {
                        let mut line = vec![StyledSpan::new("  ", Style::Plain)];
                        line.extend(spans.into_iter().map(|s| StyledSpan {
                            text: sanitize_for_display(&s.text).into_owned(),
                            style: s.style,
                        }));
                        self.lines.push(StyledLine { spans: line });
                    }
                }
                None => {
                    for line in code.split('\n') {
                        self.lines.push(StyledLine {
                            spans: vec![
                                StyledSpan::new("  ", Style::Plain),
                                StyledSpan::new(sanitize_for_display(line), Style::CodeBlock),
                            ],
                        });
                    }
                }
            }
        }

        self.lines.push(StyledLine::plain("```", Style::CodeFence));
        self.code_blocks.push(CodeBlock {
            language: pending.language,
            code,
            header_line,
        });
    }

    fn finish(mut self) -> MarkdownDocument {
        if self.code_block.is_some() {
            self.flush_code_block();
        }
        self.flush_text();

        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(StyledLine::empty());
        }

        MarkdownDocument {
            lines: self.lines,
            code_blocks: self.code_blocks,
        }
    }
}

fn list_wrap_options(
    width: usize,
    quote: String,
    depth: usize,
    list: &ListState,
    first: bool,
) -> WrapOptions {
    let indent = quote + &"  ".repeat(depth.saturating_sub(1));
    let (marker, marker_style) = if list.ordered {
        (format!("{}. ", list.next_number), Style::ListNumber)
    } else {
        ("• ".to_string(), Style::ListBullet)
    };
    let hanging = StyledSpan::new(
        format!("{indent}{}", " ".repeat(marker.width())),
        Style::Plain,
    );

    let first_prefix = if first {
        vec![
            StyledSpan::new(indent, Style::Plain),
            StyledSpan::new(marker, marker_style),
        ]
    } else {
        vec![hanging.clone()]
    };
    WrapOptions::with_prefixes(width, first_prefix, vec![hanging])
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::H1,
        HeadingLevel::H2 => Style::H2,
        HeadingLevel::H3 => Style::H3,
        HeadingLevel::H4 => Style::H4,
        HeadingLevel::H5 | HeadingLevel::H6 => Style::MinorHeading,
    }
}
