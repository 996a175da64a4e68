use crate::evaluator::{default_min_length, Direction, ExpectedStrokeDescriptor};
use crate::stroke::StrokeKind;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

static CURRICULUM_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/curriculum");

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("curriculum file {0} not found")]
    Missing(String),
    #[error("curriculum file {0} is not utf-8")]
    Encoding(String),
    #[error("unable to parse curriculum file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One shorthand outline a learner can practise
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SymbolEntry {
    pub id: String,
    pub character: String,
    pub stroke_kind: StrokeKind,
    pub direction: Direction,
    pub position: String,
    pub phonetic_name: String,
    pub category: String,
    #[serde(default = "default_min_length")]
    pub min_length: f64,
    #[serde(default)]
    pub related_symbols: Vec<String>,
    #[serde(default)]
    pub common_words: Vec<String>,
}

impl SymbolEntry {
    pub fn expected(&self) -> ExpectedStrokeDescriptor {
        ExpectedStrokeDescriptor::new(self.direction, self.min_length, self.stroke_kind)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct DictationPassage {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub difficulty: String,
    pub text: String,
    #[serde(default)]
    pub focus_points: Vec<String>,
}

impl DictationPassage {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Deserialize)]
struct SymbolTable {
    symbols: Vec<SymbolEntry>,
}

#[derive(Deserialize)]
struct PassageTable {
    passages: Vec<DictationPassage>,
}

/// Read-only reference tables: stroke descriptors and dictation passages
#[derive(Clone, Debug)]
pub struct Curriculum {
    symbols: Vec<SymbolEntry>,
    passages: Vec<DictationPassage>,
}

impl Curriculum {
    /// Parses the tables embedded at build time
    pub fn load() -> Result<Self, CurriculumError> {
        let symbols: SymbolTable = read_table("symbols.json")?;
        let passages: PassageTable = read_table("dictation.json")?;
        Ok(Self {
            symbols: symbols.symbols,
            passages: passages.passages,
        })
    }

    /// Shared copy of the embedded tables
    pub fn builtin() -> &'static Curriculum {
        static BUILTIN: OnceLock<Curriculum> = OnceLock::new();
        BUILTIN.get_or_init(|| Curriculum::load().expect("embedded curriculum is valid"))
    }

    pub fn symbols(&self) -> &[SymbolEntry] {
        &self.symbols
    }

    /// Case-insensitive lookup by symbol id
    pub fn symbol(&self, id: &str) -> Option<&SymbolEntry> {
        self.symbols.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    pub fn expected(&self, id: &str) -> Option<ExpectedStrokeDescriptor> {
        self.symbol(id).map(SymbolEntry::expected)
    }

    pub fn symbols_by_direction(&self, direction: Direction) -> impl Iterator<Item = &SymbolEntry> {
        self.symbols.iter().filter(move |s| s.direction == direction)
    }

    pub fn passages(&self) -> &[DictationPassage] {
        &self.passages
    }

    pub fn passage(&self, id: &str) -> Option<&DictationPassage> {
        self.passages.iter().find(|p| p.id == id)
    }
}

fn read_table<T: for<'de> Deserialize<'de>>(file_name: &str) -> Result<T, CurriculumError> {
    let file = CURRICULUM_DIR
        .get_file(file_name)
        .ok_or_else(|| CurriculumError::Missing(file_name.to_string()))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| CurriculumError::Encoding(file_name.to_string()))?;

    serde_json::from_str(contents).map_err(|source| CurriculumError::Parse {
        file: file_name.to_string(),
        source,
    })
}
