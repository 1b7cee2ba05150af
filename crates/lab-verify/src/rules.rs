//! Parameter rule tables keyed by treatment label.
//!
//! A run's directory name carries treatment labels (`MUT_01`, `ARGS_NUM`,
//! `PROBLEM_median`, ...). Each label selects the `set ...` lines and log
//! messages its `run.log` must contain. Matching is substring containment, so a
//! single run name can select several entries from the same table.

/// Required in every run regardless of treatment.
pub const GENERAL_PARAMETERS: &[&str] = &["set PROG_POP_SIZE 500"];

/// An ordered, immutable mapping from treatment label to required log strings.
#[derive(Debug)]
pub struct RuleTable {
    pub name: &'static str,
    pub entries: &'static [(&'static str, &'static [&'static str])],
}

impl RuleTable {
    /// Entries whose label occurs anywhere in `run_name`, in table order.
    pub fn matching<'a>(
        &'a self,
        run_name: &'a str,
    ) -> impl Iterator<Item = (&'static str, &'static [&'static str])> + 'a {
        self.entries
            .iter()
            .copied()
            .filter(move |(label, _)| run_name.contains(label))
    }
}

pub static MUTATION_RATE: RuleTable = RuleTable {
    name: "mutation_rate",
    entries: &[
        ("MUT_5", &["set PROG_MUT__PER_BIT_FLIP 0.5", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.5"]),
        ("MUT_1", &["set PROG_MUT__PER_BIT_FLIP 0.1", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.1"]),
        ("MUT_075", &["set PROG_MUT__PER_BIT_FLIP 0.075", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.075"]),
        ("MUT_05", &["set PROG_MUT__PER_BIT_FLIP 0.05", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.05"]),
        ("MUT_025", &["set PROG_MUT__PER_BIT_FLIP 0.025", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.025"]),
        ("MUT_01", &["set PROG_MUT__PER_BIT_FLIP 0.01", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.01"]),
        ("MUT_0075", &["set PROG_MUT__PER_BIT_FLIP 0.0075", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.0075"]),
        ("MUT_005", &["set PROG_MUT__PER_BIT_FLIP 0.005", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.005"]),
        ("MUT_0025", &["set PROG_MUT__PER_BIT_FLIP 0.0025", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.0025"]),
        ("MUT_001", &["set PROG_MUT__PER_BIT_FLIP 0.001", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.001"]),
        ("MUT_0001", &["set PROG_MUT__PER_BIT_FLIP 0.0001", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.0001"]),
        ("MUT_00001", &["set PROG_MUT__PER_BIT_FLIP 0.00001", "set PROG_MUT__PER_NUMERIC_ARG_SUB 0.00001"]),
    ],
};

pub static ARGUMENT_MODE: RuleTable = RuleTable {
    name: "argument_mode",
    entries: &[
        (
            "ARGS_TAG_BF",
            &[
                "set PROGRAM_ARGUMENT_MODE 0",
                "Adding default TAG-BASED ARGUMENT instructions WITHOUT TYPE SEARCHING.",
            ],
        ),
        (
            "ARGS_NUM",
            &[
                "set PROGRAM_ARGUMENT_MODE 1",
                "Adding default NUMERIC ARGUMENT instructions.",
            ],
        ),
    ],
};

pub static PROBLEM: RuleTable = RuleTable {
    name: "problem",
    entries: &[
        (
            "PROBLEM_for-loop-index",
            &[
                "set GENERATIONS 300",
                "set PROBLEM for-loop-index",
                "set PROG_EVAL_TIME 256",
                "set MAX_PROG_SIZE 128",
                "Loaded TRAINING set size = 100",
            ],
        ),
        (
            "PROBLEM_grade",
            &[
                "set GENERATIONS 300",
                "set PROBLEM grade",
                "set PROG_EVAL_TIME 128",
                "set MAX_PROG_SIZE 128",
                "Loaded TRAINING set size = 200",
            ],
        ),
        (
            "PROBLEM_median",
            &[
                "set GENERATIONS 300",
                "set PROBLEM median",
                "set PROG_EVAL_TIME 64",
                "set MAX_PROG_SIZE 64",
                "Loaded TRAINING set size = 100",
            ],
        ),
        (
            "PROBLEM_number-io",
            &[
                "set GENERATIONS 100",
                "set PROBLEM number-io",
                "set PROG_EVAL_TIME 32",
                "set MAX_PROG_SIZE 32",
                "Loaded TRAINING set size = 25",
            ],
        ),
        (
            "PROBLEM_smallest",
            &[
                "set GENERATIONS 300",
                "set PROBLEM smallest",
                "set PROG_EVAL_TIME 64",
                "set MAX_PROG_SIZE 64",
                "Loaded TRAINING set size = 100",
            ],
        ),
    ],
};

/// The label-keyed tables in the order they are checked.
pub fn treatment_tables() -> [&'static RuleTable; 3] {
    [&MUTATION_RATE, &ARGUMENT_MODE, &PROBLEM]
}
