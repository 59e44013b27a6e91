use colored::Colorize;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Render markdown to a string with ANSI styling for terminal display.
/// Structure is kept readable rather than pixel-faithful: headings keep
/// their `#` prefixes, code fences stay visible, lists get `-` bullets.
pub fn render_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(input, options);

    let mut out = String::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut heading: Option<HeadingLevel> = None;
    let mut in_code_block = false;
    let mut list_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    ensure_blank_line(&mut out);
                    let prefix = match level {
                        HeadingLevel::H1 => "# ",
                        HeadingLevel::H2 => "## ",
                        HeadingLevel::H3 => "### ",
                        _ => "#### ",
                    };
                    out.push_str(&prefix.cyan().bold().to_string());
                    heading = Some(level);
                }
                Tag::Strong => bold += 1,
                Tag::Emphasis => italic += 1,
                Tag::CodeBlock(kind) => {
                    ensure_blank_line(&mut out);
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => lang.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    out.push_str(&"```".dimmed().to_string());
                    if !lang.is_empty() {
                        out.push_str(&lang.magenta().to_string());
                    }
                    out.push('\n');
                    in_code_block = true;
                }
                Tag::List(_) => {
                    if list_depth == 0 {
                        ensure_line_break(&mut out);
                    }
                    list_depth += 1;
                }
                Tag::Item => {
                    ensure_line_break(&mut out);
                    out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                    out.push_str("- ");
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    heading = None;
                    out.push('\n');
                }
                TagEnd::Strong => bold = bold.saturating_sub(1),
                TagEnd::Emphasis => italic = italic.saturating_sub(1),
                TagEnd::CodeBlock => {
                    ensure_line_break(&mut out);
                    out.push_str(&"```".dimmed().to_string());
                    out.push('\n');
                    in_code_block = false;
                }
                TagEnd::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        out.push('\n');
                    }
                }
                TagEnd::Paragraph => {
                    if list_depth == 0 {
                        out.push_str("\n\n");
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    out.push_str(&text.yellow().to_string());
                } else if heading.is_some() {
                    out.push_str(&text.cyan().bold().to_string());
                } else {
                    let styled = match (bold > 0, italic > 0) {
                        (true, _) => text.bold().to_string(),
                        (false, true) => text.italic().to_string(),
                        (false, false) => text.to_string(),
                    };
                    out.push_str(&styled);
                }
            }
            Event::Code(code) => {
                out.push_str(&code.yellow().to_string());
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str(&"────────".dimmed().to_string());
                out.push('\n');
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    ensure_line_break(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}
