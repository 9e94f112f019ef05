//! Prompt merging: split, clean and re-join several prompt strings.

/// Built-in separators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `,`
    Comma,
    /// `.`
    Period,
    /// `|`
    #[default]
    Pipe,
    /// `\n`
    Newline,
}

impl Separator {
    /// Separator text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Period => ".",
            Self::Pipe => "|",
            Self::Newline => "\n",
        }
    }
}

/// Options for [`merge_prompts`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeOpts {
    /// Preset used when `custom_separator` is empty.
    pub separator: Separator,
    /// Overrides `separator` when non-empty.
    pub custom_separator: String,
    /// Replace line breaks inside each input with spaces.
    pub strip_newlines: bool,
    /// Drop whitespace-only lines and empty tokens.
    pub drop_empty_lines: bool,
    /// Keep each input whole and put the separator on its own line between inputs.
    pub segment_per_input: bool,
}

impl MergeOpts {
    /// Separator actually used.
    pub fn effective_separator(&self) -> &str {
        if self.custom_separator.is_empty() {
            self.separator.as_str()
        } else {
            &self.custom_separator
        }
    }
}

/// Merge `inputs` into a single prompt.
pub fn merge_prompts<S: AsRef<str>>(inputs: &[S], opts: &MergeOpts) -> String {
    let sep = opts.effective_separator();

    let mut tokens: Vec<String> = Vec::new();
    for input in inputs {
        let mut s = input.as_ref().replace("\r\n", "\n").replace('\r', "\n");
        if opts.drop_empty_lines {
            s = s
                .split('\n')
                .filter(|ln| !ln.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n");
        }
        if opts.strip_newlines {
            s = s.replace('\n', " ");
        }

        if opts.segment_per_input {
            tokens.push(s.trim().to_string());
        } else {
            tokens.extend(s.split(sep).map(|p| p.trim().to_string()));
        }
    }
    if opts.drop_empty_lines {
        tokens.retain(|t| !t.trim().is_empty());
    }

    let joiner = if !opts.segment_per_input {
        sep.to_string()
    } else if sep == "\n" {
        "\n\n".to_string()
    } else {
        format!("\n{sep}\n")
    };
    tokens.join(&joiner)
}

#[cfg(test)]
#[path = "../../tests/unit/text/merge.rs"]
mod tests;
