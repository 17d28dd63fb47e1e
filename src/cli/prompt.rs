//! Line-based interactive prompts.

use anyhow::{bail, Result};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask until a non-empty answer is given.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        loop {
            write!(self.output, "{}", question)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("Input closed while waiting for: {}", question.trim());
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }

    /// Ask until the answer parses as `T`.
    pub fn ask_parsed<T>(&mut self, question: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(question)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "Invalid value {:?}: {}", answer, e)?,
            }
        }
    }

    /// Ask a y/n question.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            let answer = self.ask(question)?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n")?,
            }
        }
    }

    pub fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}
