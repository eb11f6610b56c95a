//! Canonical rule tables.
//!
//! Patterns carry their own flags (`(?i)`, `(?m)`); nothing is added at
//! compile time. Keyword lists are matched case-insensitively from a word
//! boundary by the core.

use chatpress_types::AnchorKind;

pub(crate) const BANNED_PHRASES: &[&str] = &[
    "Key technical component in the research discussion",
    "An analysis of X exploring what are the key insights",
    "The methodology employed ensures comprehensive coverage",
    "cross-cultural and longitudinal studies",
    "Key technical component in the discussion",
    "comprehensive discussion and analysis",
    "This research analysis examines",
    "Academic research methodology or concept",
    "Societal or policy aspect of the research",
    "through comprehensive discussion and analysis",
    "ensures comprehensive coverage of key concepts",
    "reveals important insights about the topic and its implications",
];

// Anchor batteries, one slice per kind.

pub(crate) const DECISION_PATTERNS: &[&str] = &[
    r"(?i)\b(decided|chose|selected|picked|went with|using|let'?s use|let'?s go with|we'll use|we used|settled on|switched to)\b",
    r"(?i)\b(shipped|rollback|bypass|revert|implemented|deployed)\b",
    r"(?i)\b(architecture|approach|strategy|method|solution)\b",
];

pub(crate) const COMMAND_PATTERNS: &[&str] = &[
    r"(?im)^(?:\$|[ \t]{0,3}(?:curl|bash|sh|ollama|litellm|pytest|git|python3?|docker|brew)\b).*",
    r"(?i)```(?:bash|sh|zsh|shell)?\n[\s\S]*?```",
    r"(?i)\b(install|run|execute|pull|push|build|test)\b.*",
];

pub(crate) const CITATION_PATTERNS: &[&str] = &[
    r"(?i)\(msg\s+\d+\)",
    r"(?i)\b(paper|study|research|article|book|author|citation|reference)\b",
    r"(?i)\b(reading list|literature|academic|scholarly)\b",
];

pub(crate) const ERROR_PATTERNS: &[&str] = &[
    r"(?i)\b(error|failed|exception|timeout|crash|bug|issue|problem)\b",
    r"(?i)\b(debug|fix|resolve|troubleshoot|investigate)\b",
];

pub(crate) const MODEL_PATTERNS: &[&str] = &[
    r"(?i)\b(ollama|litellm|llama|gpt|claude|model|ai|llm)\b",
    r"(?i)\b(q[45]_K_M|quantized|fine-tuned|trained)\b",
];

pub(crate) const SHIP_ACTION_PATTERNS: &[&str] = &[
    r"(?i)\b(shipped|deployed|released|launched|published|live|production)\b",
    r"(?i)\b(rollback|revert|undo|backout)\b",
];

pub(crate) const RESEARCH_TERMS: &str = r"(?i)\b(dataset|benchmark|paper|citation|RAG|graphRAG|Ray|Anyscale|architecture|method|methodology|experiment|reading\s+list|evaluation|ablation|baseline|fine-?tuning)\b";

pub(crate) const CRITIQUE_TOKENS: &str = r"(?i)\b(thesis|claim|counterpoint|counter-?argument|stance|agree|disagree|critique|opinion|believe|think|argue|contend)\b";

pub(crate) const OPINION_PATTERNS: &[&str] = &[
    CRITIQUE_TOKENS,
    r"(?i)\b(however|but|on the other hand|critics might|steelman)\b",
];

/// `(kind, needle, tag, case_sensitive)`
pub(crate) const TAG_RULES: &[(AnchorKind, &str, &str, bool)] = &[
    (AnchorKind::Command, "ollama", "ollama", false),
    (AnchorKind::Command, "litellm", "litellm", false),
    (AnchorKind::Command, "curl", "api", false),
    (AnchorKind::Command, "docker", "container", false),
    (AnchorKind::Command, "pytest", "testing", false),
    (AnchorKind::Model, "q4_K_M", "quantized", true),
    (AnchorKind::Model, "q5_K_M", "quantized", true),
    (AnchorKind::Model, "ollama", "local", false),
    (AnchorKind::Model, "litellm", "proxy", false),
    (AnchorKind::ResearchNoun, "ray", "distributed", false),
    (AnchorKind::ResearchNoun, "rag", "retrieval", false),
    (AnchorKind::ResearchNoun, "dataset", "data", false),
    (AnchorKind::ResearchNoun, "benchmark", "evaluation", false),
];

// Router tables.

pub(crate) const BLOCKED_REASON: &str = "Unclear genre (insufficient signals)";

pub(crate) const SYSTEM_KEYWORDS: &[&str] = &[
    "summarizer",
    "pipeline",
    "system",
    "build",
    "develop",
    "create",
    "implement",
    "failure modes",
    "alignment",
    "redundancy",
    "hallucinations",
    "golden set",
    "heuristics",
    "signal extraction",
    "sprint plan",
    "validation rules",
    "input features",
    "templates",
    "automated routing",
    "testing steps",
];

pub(crate) const LOCAL_TOOLING_TERMS: &[&str] = &["ollama", "litellm"];

pub(crate) const DECISION_KEYWORDS: &[&str] = &[
    "decided",
    "chose",
    "selected",
    "picked",
    "went with",
    "using",
    "let's use",
    "let's go with",
    "we'll use",
    "we used",
    "shipped",
    "rollback",
    "bypass",
    "revert",
    "implemented",
    "deployed",
];

pub(crate) const RESEARCH_PHRASES: &[&str] = &[
    "research findings",
    "study results",
    "data analysis",
    "statistical analysis",
    "hypothesis testing",
    "research methodology",
    "literature review",
    "academic paper",
    "peer-reviewed",
    "published study",
    "research paper",
    "empirical evidence",
];

pub(crate) const RESEARCH_OBJECTS: &str =
    r"(?i)\b(dataset|benchmark|ray|anyscale|rag|graphrag|retrieval[- ]augmented)\b";

pub(crate) const CRITIQUE_PHRASES: &[&str] = &[
    "I argue",
    "I contend",
    "I agree",
    "I disagree",
    "My thesis",
    "The claim",
    "however",
    "but",
    "on the other hand",
    "critics might",
    "steelman",
    "in my opinion",
    "I believe",
    "I think",
];

// Judge tables.

pub(crate) const TLDR_HEADINGS: &[&str] = &["TL;DR", "TLDR"];
pub(crate) const DECISION_LOG_HEADINGS: &[&str] =
    &["Decision Log", "Key Decisions", "Key Engineering Decisions"];
pub(crate) const COMMANDS_HEADINGS: &[&str] = &["Exact Commands", "Commands", "How to Reproduce"];
pub(crate) const OPEN_QUESTIONS_HEADINGS: &[&str] =
    &["Open Questions", "Next Work", "Future Work", "Next"];
pub(crate) const TAGS_HEADINGS: &[&str] = &["Tags", "Tag"];
pub(crate) const ABSTRACT_HEADINGS: &[&str] = &["Abstract", "Dek"];
pub(crate) const RESEARCH_QUESTIONS_HEADINGS: &[&str] =
    &["Research Questions", "Research Question", "Questions"];
pub(crate) const FINDINGS_HEADINGS: &[&str] = &["Findings", "Key Insights", "Results"];
pub(crate) const THESIS_HEADINGS: &[&str] = &["Thesis", "Claim", "Stance"];
pub(crate) const COUNTERPOINTS_HEADINGS: &[&str] = &[
    "Counterpoints",
    "Counterarguments",
    "Counter-arguments",
    "Steelman",
];

pub(crate) const COMMAND_LINE: &str =
    r"(?m)^(?:\$|[ \t]{0,3}(?:curl|bash|sh|ollama|litellm|pytest|git|python3?|docker|brew)\b).*";
pub(crate) const COMMAND_BLOCK: &str = r"```(?:bash|sh|zsh|shell)?\n[\s\S]*?```";
pub(crate) const COMMAND_FLAG: &str = r"\s--[A-Za-z0-9_-]+";
pub(crate) const QUANTIZATION: &str = r"\bq[45]_K_M\b";
pub(crate) const SHIPPING_DECISION: &str =
    r"(?i)\b(shipped|bypass|decided|rollback|we used|we'll use|chose|selected|went with)\b";

pub(crate) const RESEARCH_TOOLING_TERMS: &[&str] = &["Ray", "RAG", "FAISS", "LangChain", "Anyscale"];

pub(crate) const STANCE_PATTERNS: &[&str] = &[
    r"(?i)\b(I argue|I contend|I agree|I disagree|My thesis|The claim)\b",
    r"(?i)\b(I believe|I think|In my opinion)\b",
];

pub(crate) const CONSEQUENCE_TERMS: &[&str] = &[
    "risk",
    "cost",
    "harm",
    "benefit",
    "trade-off",
    "consequence",
    "impact",
];

// Repair templates.

pub(crate) const DECISION_LOG_HEADING: &str = "Key Engineering Decisions";
pub(crate) const FALLBACK_DECISION: &str =
    "We decided to ship the approach settled in the conversation as the working baseline.";
pub(crate) const FALLBACK_COMMANDS: &[&str] = &["git status --short", "git log --oneline -n 5"];
pub(crate) const EXPANSION_HEADING: &str = "Additional Context";
pub(crate) const EXPANSION_PARAGRAPH: &str = "The discussion reveals nuances that affect how the topic should be read. \
Examining the competing perspectives side by side gives a fuller view of the underlying issues and the candidate solutions, \
so that later decisions are made with the relevant factors in plain sight.";
pub(crate) const THESIS_STATEMENT: &str = "I argue that the current approach has significant limitations that need to be addressed, \
and that the alternatives raised in the conversation would serve the stated goals better.";
pub(crate) const COUNTERPOINTS: &[&str] = &[
    "Critics might argue that this perspective is too narrow and does not consider the broader implications of the proposed changes.",
    "Some may counter that the evidence presented is insufficient to support such strong conclusions about the alternatives.",
    "Opponents could claim that the analysis underplays implementation challenges.",
    "Others might argue that the proposed solutions are not practical given current constraints and resources.",
];

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
