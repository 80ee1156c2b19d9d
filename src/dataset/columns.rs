//! Column names of the question source and of the result batches.

pub const QUESTION: &str = "questão";
pub const OPTIONS: [&str; 5] = [
    "alternativa_a",
    "alternativa_b",
    "alternativa_c",
    "alternativa_d",
    "alternativa_e",
];
pub const CORRECT: &str = "alternativa_correta";
pub const CORRECT_ALIAS: &str = "alternativa correta";
pub const EXAM: &str = "vestibular";
pub const AREA: &str = "area_conhecimento";
pub const AREA_ALIAS: &str = "eixo de conhecimento";

pub const CHOSEN: &str = "alternativa escolhida pela ia";
pub const RAW_RESPONSE: &str = "resposta original";
pub const MODEL: &str = "modelo";
pub const ELAPSED: &str = "processing time";
pub const TEMPERATURE: &str = "temperature used during test";

/// Backup of the inline first-letter parse, written by the cleaner.
pub const LEGACY_CHOSEN: &str = "parser_antigo";

pub const RESULT_COLUMNS: [&str; 5] = [CHOSEN, RAW_RESPONSE, MODEL, ELAPSED, TEMPERATURE];
