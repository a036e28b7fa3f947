//! Type styles and the stylesheet used to resolve inline markup.

use std::collections::HashMap;

use crate::color::Color;
use crate::error::{invalid_arg, Error};

/// The default typeface for new contexts.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// The default point size for text.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Horizontal alignment for text blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A fully-resolved type style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    /// Multiple of the point size.
    pub line_height: f64,
    pub align: TextAlign,
    /// Overrides the context fill when set.
    pub fill: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> TextStyle {
        TextStyle {
            family: DEFAULT_FONT_FAMILY.to_string(),
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            line_height: 1.2,
            align: TextAlign::Left,
            fill: None,
        }
    }
}

/// A partial type style; unset fields inherit from the base style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePatch {
    pub family: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub line_height: Option<f64>,
    pub align: Option<TextAlign>,
    pub fill: Option<Color>,
}

impl StylePatch {
    pub fn new() -> StylePatch {
        StylePatch::default()
    }

    pub fn family(mut self, family: impl Into<String>) -> StylePatch {
        self.family = Some(family.into());
        self
    }

    pub fn size(mut self, size: f64) -> StylePatch {
        self.size = Some(size);
        self
    }

    pub fn bold(mut self, bold: bool) -> StylePatch {
        self.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> StylePatch {
        self.italic = Some(italic);
        self
    }

    pub fn fill(mut self, fill: Color) -> StylePatch {
        self.fill = Some(fill);
        self
    }

    /// Resolve against a base style; set fields win.
    pub fn apply_to(&self, base: &TextStyle) -> TextStyle {
        TextStyle {
            family: self.family.clone().unwrap_or_else(|| base.family.clone()),
            size: self.size.unwrap_or(base.size),
            bold: self.bold.unwrap_or(base.bold),
            italic: self.italic.unwrap_or(base.italic),
            line_height: self.line_height.unwrap_or(base.line_height),
            align: self.align.unwrap_or(base.align),
            fill: self.fill.or(base.fill),
        }
    }
}

/// A run of text with the style resolved for it.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub style: TextStyle,
}

/// A mapping from style-tag names to partial type styles.
///
/// Used by the text command to resolve `<tag>…</tag>` markup: tagged runs
/// take the tag's patch applied over the enclosing style, so nested tags
/// compose rightmost-override and untagged text keeps the context's style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    styles: HashMap<String, StylePatch>,
}

impl Stylesheet {
    pub fn new() -> Stylesheet {
        Stylesheet::default()
    }

    /// Define (or redefine) a named style.
    pub fn define(&mut self, name: impl Into<String>, patch: StylePatch) {
        self.styles.insert(name.into(), patch);
    }

    /// Delete a named style, returning its previous definition.
    pub fn remove(&mut self, name: &str) -> Option<StylePatch> {
        self.styles.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&StylePatch> {
        self.styles.get(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Split marked-up text into styled spans against a base style.
    ///
    /// Tags not present in the sheet leave the enclosing style unchanged.
    /// Unbalanced or mismatched tags are an error.
    pub fn spans(&self, markup: &str, base: &TextStyle) -> Result<Vec<StyledSpan>, Error> {
        let mut spans = Vec::new();
        let mut open: Vec<(String, TextStyle)> = Vec::new();
        let mut current = base.clone();
        let mut text = String::new();
        let mut rest = markup;

        while let Some(lt) = rest.find('<') {
            text.push_str(&rest[..lt]);
            let after = &rest[lt + 1..];
            let gt = after
                .find('>')
                .ok_or_else(|| invalid_arg(format!("text: unterminated tag in {markup:?}")))?;
            let tag = &after[..gt];
            rest = &after[gt + 1..];

            if !text.is_empty() {
                spans.push(StyledSpan {
                    text: std::mem::take(&mut text),
                    style: current.clone(),
                });
            }

            if let Some(name) = tag.strip_prefix('/') {
                match open.pop() {
                    Some((opened, prior)) if opened == name => current = prior,
                    Some((opened, _)) => {
                        return Err(invalid_arg(format!(
                            "text: mismatched closing tag </{name}> (expected </{opened}>)"
                        )))
                    }
                    None => {
                        return Err(invalid_arg(format!(
                            "text: closing tag </{name}> with nothing open"
                        )))
                    }
                }
            } else {
                open.push((tag.to_string(), current.clone()));
                if let Some(patch) = self.styles.get(tag) {
                    current = patch.apply_to(&current);
                }
            }
        }
        text.push_str(rest);
        if !text.is_empty() {
            spans.push(StyledSpan {
                text,
                style: current,
            });
        }
        if let Some((name, _)) = open.pop() {
            return Err(invalid_arg(format!("text: unclosed tag <{name}>")));
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Stylesheet {
        let mut sheet = Stylesheet::new();
        sheet.define("em", StylePatch::new().italic(true));
        sheet.define("loud", StylePatch::new().bold(true).size(36.0));
        sheet
    }

    #[test]
    fn untagged_text_keeps_the_base_style() {
        let base = TextStyle::default();
        let spans = sheet().spans("plain words", &base).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style, base);
    }

    #[test]
    fn nested_tags_compose_rightmost_override() {
        let base = TextStyle::default();
        let spans = sheet()
            .spans("a <loud>b <em>c</em></loud> d", &base)
            .unwrap();
        let styles: Vec<(&str, bool, bool, f64)> = spans
            .iter()
            .map(|s| (s.text.as_str(), s.style.bold, s.style.italic, s.style.size))
            .collect();
        assert_eq!(
            styles,
            vec![
                ("a ", false, false, DEFAULT_FONT_SIZE),
                ("b ", true, false, 36.0),
                ("c", true, true, 36.0),
                (" d", false, false, DEFAULT_FONT_SIZE),
            ]
        );
    }

    #[test]
    fn unknown_tags_inherit() {
        let base = TextStyle::default();
        let spans = sheet().spans("<nope>same</nope>", &base).unwrap();
        assert_eq!(spans[0].style, base);
    }

    #[test]
    fn unbalanced_markup_errors() {
        let base = TextStyle::default();
        assert!(sheet().spans("<em>oops", &base).is_err());
        assert!(sheet().spans("oops</em>", &base).is_err());
        assert!(sheet().spans("<em>x</loud>", &base).is_err());
    }
}
