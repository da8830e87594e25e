/// Display name used when a stage code is not in the registry.
pub const FALLBACK_STAGE_NAME: &str = "Processing...";

/// One pipeline stage as announced by `STAGE:<code>` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDescriptor {
    pub code: &'static str,
    pub display_name: &'static str,
    pub ordinal: u8,
}

impl StageDescriptor {
    pub const fn new(code: &'static str, display_name: &'static str, ordinal: u8) -> Self {
        Self {
            code,
            display_name,
            ordinal,
        }
    }
}

const RESEARCH_PIPELINE: &[StageDescriptor] = &[
    StageDescriptor::new("1", "Topic Decomposition", 1),
    StageDescriptor::new("2", "Document Discovery", 2),
    StageDescriptor::new("3", "Deep Analysis", 3),
    // Sub-stage: extends deep analysis without advancing progress.
    StageDescriptor::new("3b", "Recursive Deepening", 3),
    StageDescriptor::new("4", "Academic Scoring", 4),
    StageDescriptor::new("5", "Filtering & Selection", 5),
    StageDescriptor::new("6", "Synthesis", 6),
    StageDescriptor::new("7", "Draft Generation", 7),
    StageDescriptor::new("8", "Peer Review", 8),
];

/// Immutable code → stage table.
///
/// Sub-stages are plain entries sharing their parent's ordinal, so the
/// controller never needs to special-case them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRegistry {
    stages: Vec<StageDescriptor>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::research_pipeline()
    }
}

impl StageRegistry {
    /// Builds a registry from an arbitrary table. Entries with a duplicate
    /// code are ignored after the first one.
    pub fn new(stages: Vec<StageDescriptor>) -> Self {
        let mut unique: Vec<StageDescriptor> = Vec::with_capacity(stages.len());
        for stage in stages {
            if !unique.iter().any(|known| known.code == stage.code) {
                unique.push(stage);
            }
        }
        Self { stages: unique }
    }

    /// The eight-stage research pipeline (plus the `3b` sub-stage).
    pub fn research_pipeline() -> Self {
        Self::new(RESEARCH_PIPELINE.to_vec())
    }

    pub fn lookup(&self, code: &str) -> Option<StageDescriptor> {
        self.stages.iter().copied().find(|stage| stage.code == code)
    }

    /// Resolves a code, falling back to a "Processing..." descriptor that
    /// keeps `current_ordinal` for unknown codes.
    pub fn resolve(&self, code: &str, current_ordinal: u8) -> StageDescriptor {
        self.lookup(code).unwrap_or(StageDescriptor {
            code: "",
            display_name: FALLBACK_STAGE_NAME,
            ordinal: current_ordinal,
        })
    }

    /// The stage a fresh job starts in (lowest ordinal, first declared).
    pub fn first(&self) -> Option<StageDescriptor> {
        self.stages
            .iter()
            .copied()
            .reduce(|best, stage| if stage.ordinal < best.ordinal { stage } else { best })
    }

    /// Highest ordinal in the table; the denominator of the progress fraction.
    pub fn total(&self) -> u8 {
        self.stages
            .iter()
            .map(|stage| stage.ordinal)
            .max()
            .unwrap_or(0)
    }
}
