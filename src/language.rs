//! Supported source languages and the detection strategy each one gets.
//!
//! Exactly one strategy runs per file:
//! - `StructuredSyntax`: Python, parsed with tree-sitter
//! - `BraceLanguage`: JavaScript, line heuristics
//! - `Generic`: every other supported extension

use std::path::Path;

use phf::phf_map;

/// A supported source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    CSharp,
    Php,
    Ruby,
    Go,
}

/// Detection strategy selected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    StructuredSyntax,
    BraceLanguage,
    Generic,
}

static EXTENSIONS: phf::Map<&'static str, Language> = phf_map! {
    "py" => Language::Python,
    "js" => Language::JavaScript,
    "java" => Language::Java,
    "cpp" => Language::Cpp,
    "c" => Language::C,
    "cs" => Language::CSharp,
    "php" => Language::Php,
    "rb" => Language::Ruby,
    "go" => Language::Go,
};

/// File extensions (without dot) that are discovered and analyzed.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["py", "js", "java", "cpp", "c", "cs", "php", "rb", "go"];

impl Language {
    /// Look up a language by extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS.get(ext).copied()
    }

    /// Determine the language of a file from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::CSharp => "csharp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Go => "go",
        }
    }

    /// Every supported language, in extension-table order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Python,
            Language::JavaScript,
            Language::Java,
            Language::Cpp,
            Language::C,
            Language::CSharp,
            Language::Php,
            Language::Ruby,
            Language::Go,
        ]
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Language::Python => Strategy::StructuredSyntax,
            Language::JavaScript => Strategy::BraceLanguage,
            _ => Strategy::Generic,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a path has one of the supported extensions.
pub fn is_supported(path: &Path) -> bool {
    Language::from_path(path).is_some()
}
