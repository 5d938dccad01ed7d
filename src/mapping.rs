//! Textual mapping specification.
//!
//! A mapping binds a record class name to the table that stores it and names
//! the primary-key column:
//!
//! ```text
//! # sample record
//! CLASS Record TABLE sample_record
//!     PRIMARY_KEY id
//! ;
//! ```
//!
//! `TABLE` is optional and defaults to the class name. Column lists come from
//! the entity type itself (see [`crate::model::Entity`]).

use std::collections::HashMap;

use crate::error::{OrmError, OrmResult};

/// Mapping of one class onto one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    pub class_name: String,
    pub table_name: String,
    pub primary_key: String,
}

/// All class mappings declared in one mapping text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Mapping {
    classes: HashMap<String, ClassMapping>,
}

struct OpenBlock {
    line: usize,
    class_name: String,
    table_name: String,
    primary_key: Option<String>,
}

impl Mapping {
    /// Parse a mapping text.
    pub fn parse(text: &str) -> OrmResult<Self> {
        let mut mapping = Mapping::default();
        let mut open: Option<OpenBlock> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut words = content.split_whitespace();
            let keyword = words.next().unwrap_or_default();
            match keyword.to_ascii_uppercase().as_str() {
                "CLASS" => {
                    if let Some(block) = &open {
                        return Err(mapping_error(
                            line,
                            format!("CLASS opened before block for '{}' was closed", block.class_name),
                        ));
                    }
                    let class_name = identifier(words.next(), line, "class name")?;
                    let table_name = match words.next() {
                        None => class_name.clone(),
                        Some(word) if word.eq_ignore_ascii_case("TABLE") => {
                            identifier(words.next(), line, "table name")?
                        }
                        Some(other) => {
                            return Err(mapping_error(line, format!("expected TABLE, found '{other}'")))
                        }
                    };
                    expect_end(words, line)?;
                    if mapping.classes.contains_key(&class_name) {
                        return Err(mapping_error(line, format!("class '{class_name}' is declared twice")));
                    }
                    open = Some(OpenBlock {
                        line,
                        class_name,
                        table_name,
                        primary_key: None,
                    });
                }
                "PRIMARY_KEY" => {
                    let Some(block) = open.as_mut() else {
                        return Err(mapping_error(line, "PRIMARY_KEY outside of a CLASS block".to_string()));
                    };
                    if block.primary_key.is_some() {
                        return Err(mapping_error(line, "PRIMARY_KEY given twice".to_string()));
                    }
                    block.primary_key = Some(identifier(words.next(), line, "primary key column")?);
                    expect_end(words, line)?;
                }
                ";" => {
                    let Some(block) = open.take() else {
                        return Err(mapping_error(line, "';' without an open CLASS block".to_string()));
                    };
                    let primary_key = block.primary_key.ok_or_else(|| {
                        mapping_error(block.line, format!("class '{}' has no PRIMARY_KEY", block.class_name))
                    })?;
                    mapping.classes.insert(
                        block.class_name.clone(),
                        ClassMapping {
                            class_name: block.class_name,
                            table_name: block.table_name,
                            primary_key,
                        },
                    );
                }
                _ => return Err(mapping_error(line, format!("unknown keyword '{keyword}'"))),
            }
        }

        if let Some(block) = open {
            return Err(mapping_error(
                block.line,
                format!("block for class '{}' is not terminated with ';'", block.class_name),
            ));
        }

        Ok(mapping)
    }

    /// Look up the mapping for a class name.
    pub fn class(&self, class_name: &str) -> OrmResult<&ClassMapping> {
        self.classes
            .get(class_name)
            .ok_or_else(|| OrmError::UnmappedClass(class_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn mapping_error(line: usize, message: String) -> OrmError {
    OrmError::Mapping { line, message }
}

// Names end up inside SQL text, so only plain identifiers are accepted.
fn identifier(word: Option<&str>, line: usize, what: &str) -> OrmResult<String> {
    let word = word.ok_or_else(|| mapping_error(line, format!("missing {what}")))?;
    let mut chars = word.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(mapping_error(line, format!("invalid {what} '{word}'")));
    }
    Ok(word.to_string())
}

fn expect_end<'a>(mut words: impl Iterator<Item = &'a str>, line: usize) -> OrmResult<()> {
    match words.next() {
        Some(extra) => Err(mapping_error(line, format!("unexpected '{extra}'"))),
        None => Ok(()),
    }
}
