//! Classify stage: dominant operation and capability detection.
//!
//! [`OPERATIONS`] is ordered from most specific to most generic; the first
//! pattern that matches the source unit wins. Capabilities are independent
//! marker checks over both the source and the test unit.

use once_cell::sync::Lazy;
use regex::Regex;

/// An operation a source unit can be "about".
#[derive(Debug)]
pub struct Operation {
    pub id: &'static str,
    /// Human label used in headings and bullets.
    pub label: &'static str,
    /// The library call that signals this operation.
    pub call: &'static str,
    pattern: &'static str,
    /// Words that, when present in a curated description, show it already
    /// names this operation.
    pub keywords: &'static [&'static str],
    /// Body of the synthesized Key Concepts subsection.
    pub concept: &'static str,
    /// Walkthrough steps; empty means "enumerate the contract's functions".
    pub walkthrough: &'static [&'static str],
    /// Real-world use cases; empty means "fall back to the category lookup".
    pub use_cases: &'static [&'static str],
}

pub static OPERATIONS: &[Operation] = &[
    Operation {
        id: "select",
        label: "Encrypted conditional selection",
        call: "FHE.select",
        pattern: r"FHE\.select\s*\(",
        keywords: &["select", "conditional", "branchless"],
        concept: "`FHE.select(condition, a, b)` picks one of two encrypted values based on an encrypted boolean. Both branches are always evaluated, so the choice itself leaks nothing.",
        walkthrough: &[
            "Compute an encrypted condition (`ebool`) with a comparison such as `FHE.le` or `FHE.eq`.",
            "Prepare both outcomes as encrypted values.",
            "Call `FHE.select(condition, ifTrue, ifFalse)` to pick the result without branching.",
            "Store the result and grant access to it with `FHE.allowThis` / `FHE.allow`.",
        ],
        use_cases: &[
            "**Confidential transfers**: move funds only when the sender has enough balance, without revealing whether the transfer happened",
            "**Sealed-bid auctions**: keep the highest bid by selecting between encrypted bids",
        ],
    },
    Operation {
        id: "random",
        label: "On-chain encrypted randomness",
        call: "FHE.randEuint",
        pattern: r"FHE\.randE(?:uint|bool)\d*\s*\(",
        keywords: &["random", "randomness"],
        concept: "`FHE.randEuintX()` produces an encrypted random value that nobody, including validators, can predict or read.",
        walkthrough: &[
            "Request an encrypted random value with `FHE.randEuintX()`.",
            "Optionally bound it with an encrypted operation (for example `FHE.rem`).",
            "Store it and grant access to the parties allowed to decrypt it.",
        ],
        use_cases: &[
            "**Lotteries and raffles**: draw winners without exposing the seed",
            "**On-chain games**: deal hidden cards or roll hidden dice",
        ],
    },
    Operation {
        id: "division",
        label: "Encrypted division and remainder",
        call: "FHE.div",
        pattern: r"FHE\.(?:div|rem)\s*\(",
        keywords: &["division", "divide", "remainder", "FHE.div", "FHE.rem"],
        concept: "`FHE.div` and `FHE.rem` take an encrypted numerator and a plaintext divisor.",
        walkthrough: &[],
        use_cases: &[
            "**Pro-rata payouts**: split an encrypted pool among participants",
            "**Fee computation**: derive encrypted fees from encrypted amounts",
        ],
    },
    Operation {
        id: "minmax",
        label: "Encrypted minimum and maximum",
        call: "FHE.min",
        pattern: r"FHE\.(?:min|max)\s*\(",
        keywords: &["minimum", "maximum", "FHE.min", "FHE.max"],
        concept: "`FHE.min` and `FHE.max` return the smaller or larger of two encrypted values without revealing which one it was.",
        walkthrough: &[],
        use_cases: &[],
    },
    Operation {
        id: "comparison",
        label: "Encrypted comparison",
        call: "FHE.eq",
        pattern: r"FHE\.(?:eq|ne|lt|le|gt|ge)\s*\(",
        keywords: &["compar", "equal", "greater", "less than"],
        concept: "Comparisons such as `FHE.eq` or `FHE.lt` return an encrypted boolean (`ebool`). The result can feed `FHE.select` but cannot drive an `if` statement.",
        walkthrough: &[
            "Load or receive the encrypted operands.",
            "Compare them with `FHE.eq`, `FHE.lt`, `FHE.ge`, ... to obtain an `ebool`.",
            "Use the `ebool` in further encrypted logic, or grant access so it can be decrypted.",
        ],
        use_cases: &[
            "**Private eligibility checks**: prove an encrypted value meets a threshold",
            "**Confidential matching**: compare encrypted orders without revealing prices",
        ],
    },
    Operation {
        id: "bitwise",
        label: "Encrypted bitwise operations",
        call: "FHE.and",
        pattern: r"FHE\.(?:and|or|xor|not|shl|shr|rotl|rotr)\s*\(",
        keywords: &["bitwise", "xor", "shift", "rotate"],
        concept: "Bitwise operators work on encrypted integers and booleans exactly like their plaintext counterparts.",
        walkthrough: &[],
        use_cases: &[],
    },
    Operation {
        id: "multiplication",
        label: "Encrypted multiplication",
        call: "FHE.mul",
        pattern: r"FHE\.mul\s*\(",
        keywords: &["multiplication", "multiply", "FHE.mul"],
        concept: "`FHE.mul` multiplies encrypted values. It is the most expensive arithmetic operation, so prefer a plaintext operand when one side is public.",
        walkthrough: &[],
        use_cases: &[],
    },
    Operation {
        id: "addition",
        label: "Encrypted addition",
        call: "FHE.add",
        pattern: r"FHE\.add\s*\(",
        keywords: &["addition", "increment", "FHE.add"],
        concept: "`FHE.add` adds encrypted values homomorphically. The result is a new encrypted handle; overflow wraps around silently.",
        walkthrough: &[
            "Receive the encrypted operand as an external input and validate it with `FHE.fromExternal`.",
            "Combine it with the stored value using `FHE.add`.",
            "Store the new handle and grant access with `FHE.allowThis` and `FHE.allow`.",
            "Read the handle back and decrypt it off-chain to check the result.",
        ],
        use_cases: &[
            "**Private voting tallies**: add encrypted votes without revealing any single ballot",
            "**Confidential counters**: track usage or balances without exposing values",
        ],
    },
    Operation {
        id: "subtraction",
        label: "Encrypted subtraction",
        call: "FHE.sub",
        pattern: r"FHE\.sub\s*\(",
        keywords: &["subtraction", "subtract", "decrement", "FHE.sub"],
        concept: "`FHE.sub` subtracts encrypted values. Underflow wraps around, so guard it with a comparison and `FHE.select` when it matters.",
        walkthrough: &[],
        use_cases: &[],
    },
    Operation {
        id: "input",
        label: "Encrypted input handling",
        call: "FHE.fromExternal",
        pattern: r"FHE\.fromExternal\s*\(",
        keywords: &["encrypted input", "input proof", "fromExternal"],
        concept: "`FHE.fromExternal(handle, proof)` verifies a client-side encrypted input and turns it into an on-chain encrypted value.",
        walkthrough: &[],
        use_cases: &[],
    },
    Operation {
        id: "trivial",
        label: "Encrypted value creation",
        call: "FHE.asEuint",
        pattern: r"FHE\.as(?:Euint|Ebool|Eaddress)\d*\s*\(",
        keywords: &["trivial encryption", "asEuint"],
        concept: "`FHE.asEuintX(value)` turns a plaintext constant into an encrypted value (trivial encryption). The value is public to anyone reading the transaction.",
        walkthrough: &[],
        use_cases: &[],
    },
];

static OPERATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    OPERATIONS
        .iter()
        .map(|op| Regex::new(op.pattern).unwrap())
        .collect()
});

/// A generic capability section of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    InputEncryption,
    PermissionGranting,
    UserDecryption,
    PublicDecryption,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Self::InputEncryption,
        Self::PermissionGranting,
        Self::UserDecryption,
        Self::PublicDecryption,
    ];

    fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::InputEncryption => &[
                "externalEuint",
                "externalEbool",
                "externalEaddress",
                "FHE.fromExternal",
                "createEncryptedInput",
            ],
            Self::PermissionGranting => &["FHE.allow(", "FHE.allowThis(", "FHE.allowTransient("],
            Self::UserDecryption => &["userDecrypt"],
            Self::PublicDecryption => &[
                "makePubliclyDecryptable",
                "publicDecrypt",
                "requestDecryption",
                "FHE.checkSignatures",
            ],
        }
    }

    /// Bullet for the "What You'll Learn" section.
    pub fn lesson(&self) -> &'static str {
        match self {
            Self::InputEncryption => "How to encrypt inputs off-chain and validate them on-chain with input proofs",
            Self::PermissionGranting => "How to grant access to encrypted values with `FHE.allow` and `FHE.allowThis`",
            Self::UserDecryption => "How a user decrypts a value they have been granted access to",
            Self::PublicDecryption => "How to make an encrypted result publicly decryptable",
        }
    }

    /// Synthesized Key Concepts subsection: heading and body.
    pub fn concept(&self) -> (&'static str, &'static str) {
        match self {
            Self::InputEncryption => (
                "Encrypted inputs",
                "Clients encrypt values locally and send a handle together with an input proof. The contract calls `FHE.fromExternal` to check the proof before using the value.",
            ),
            Self::PermissionGranting => (
                "Access control",
                "Every encrypted handle carries an access list. `FHE.allowThis` lets the contract keep using a value across transactions; `FHE.allow` lets a specific account decrypt it.",
            ),
            Self::UserDecryption => (
                "User decryption",
                "An account that has been granted access can re-encrypt a handle under its own key and decrypt it client-side. Nobody else learns the value.",
            ),
            Self::PublicDecryption => (
                "Public decryption",
                "Values marked publicly decryptable can be revealed to everyone, for example to publish the result of an auction once it closes.",
            ),
        }
    }
}

/// Result of the Classify stage.
#[derive(Debug, Clone)]
pub struct Classification {
    pub dominant: Option<&'static Operation>,
    pub capabilities: Vec<Capability>,
}

/// The first operation in [`OPERATIONS`] whose pattern matches `source`.
pub fn dominant_operation(source: &str) -> Option<&'static Operation> {
    OPERATIONS
        .iter()
        .zip(OPERATION_PATTERNS.iter())
        .find(|(_, pattern)| pattern.is_match(source))
        .map(|(op, _)| op)
}

/// Capabilities whose markers appear in the source or the test unit.
pub fn capabilities(source: &str, test: &str) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|cap| {
            cap.markers()
                .iter()
                .any(|m| source.contains(m) || test.contains(m))
        })
        .collect()
}

pub fn classify(source: &str, test: &str) -> Classification {
    Classification {
        dominant: dominant_operation(source),
        capabilities: capabilities(source, test),
    }
}

/// Whether `text` names an operation from the table.
pub fn names_operation(text: &str) -> bool {
    let lower = text.to_lowercase();
    OPERATIONS.iter().any(|op| {
        op.keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    })
}
