//! `text` subcommand handlers.

use crate::commands::parser::TextAction;
use crate::io::StdinReader;
use crate::text::{anagrams, sorted_groups};
use anyhow::Result;
use std::io::{BufRead, Write};

pub fn run<R: BufRead, W: Write>(
    action: TextAction,
    input: &mut StdinReader<R>,
    out: &mut W,
) -> Result<()> {
    match action {
        TextAction::Anagrams => {
            let words = input.all_words()?;
            let groups = sorted_groups(anagrams(&words));
            writeln!(out, "{}", serde_json::to_string(&groups)?)?;
        }
    }
    Ok(())
}
