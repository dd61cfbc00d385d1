//! Compiled selector fallback chains.
//!
//! A chain holds CSS selectors in priority order. Lookups walk the chain and
//! stop at the first selector that yields a value.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};

/// Ordered list of compiled selectors for one field.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    entries: Vec<(String, Selector)>,
}

impl SelectorChain {
    /// Compile every selector source, failing on the first invalid one.
    pub fn compile(name: &str, sources: &[String]) -> Result<Self> {
        if sources.is_empty() {
            return Err(AppError::config(format!("selector chain '{name}' is empty")));
        }

        let entries = sources
            .iter()
            .map(|source| {
                Selector::parse(source)
                    .map(|selector| (source.clone(), selector))
                    .map_err(|e| AppError::selector(source.as_str(), format!("{e:?}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// All matches of the first selector that matches anything in the document.
    ///
    /// Matches from different selectors are never merged.
    pub fn first_in_document<'a>(
        &self,
        document: &'a Html,
    ) -> Option<(&str, Vec<ElementRef<'a>>)> {
        self.entries.iter().find_map(|(source, selector)| {
            let matches: Vec<_> = document.select(selector).collect();
            if matches.is_empty() {
                None
            } else {
                Some((source.as_str(), matches))
            }
        })
    }

    /// Apply `f` to the first match of each selector in turn, returning the
    /// first value it produces.
    pub fn find_first<'a, T>(
        &self,
        scope: ElementRef<'a>,
        f: impl FnMut(ElementRef<'a>) -> Option<T>,
    ) -> Option<T> {
        self.entries
            .iter()
            .filter_map(|(_, selector)| scope.select(selector).next())
            .find_map(f)
    }

    /// Apply `f` to every match of each selector in turn, returning the first
    /// value it produces.
    pub fn find_any<'a, T>(
        &self,
        scope: ElementRef<'a>,
        f: impl FnMut(ElementRef<'a>) -> Option<T>,
    ) -> Option<T> {
        self.entries
            .iter()
            .flat_map(|(_, selector)| scope.select(selector))
            .find_map(f)
    }
}
