#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

#[cfg(feature = "ja")]
pub mod strings {
    pub const AGENT: &str = "参加者";
    pub const ITEM: &str = "品目";
    pub const KIND: &str = "種別";
    pub const SHARE: &str = "取り分";
    pub const SATISFACTION: &str = "満足度";
    pub const INDIVISIBLE: &str = "分割不可";
    pub const DIVISIBLE: &str = "分割可";
    pub const NOTHING_RECEIVED: &str = "(なし)";
    pub const NO_SOLUTION_FOUND: &str = "配分が見つかりませんでした";
    pub const INVALID_SOLVER_CONFIGURATION: &str = "ソルバーの設定が不正です";
    pub const INCONSISTENT_ASSIGNMENT: &str = "ソルバーが不整合な配分を返しました";
    pub const FEASIBLE_NOTE: &str =
        "時間制限に達したため、この配分は最適であることが証明されていません。";
}

#[cfg(feature = "en")]
pub mod strings {
    pub const AGENT: &str = "Participant";
    pub const ITEM: &str = "Item";
    pub const KIND: &str = "Kind";
    pub const SHARE: &str = "Share";
    pub const SATISFACTION: &str = "Satisfaction";
    pub const INDIVISIBLE: &str = "indivisible";
    pub const DIVISIBLE: &str = "divisible";
    pub const NOTHING_RECEIVED: &str = "(nothing)";
    pub const NO_SOLUTION_FOUND: &str = "No solution found";
    pub const INVALID_SOLVER_CONFIGURATION: &str = "Invalid solver configuration";
    pub const INCONSISTENT_ASSIGNMENT: &str = "The solver returned an inconsistent allocation";
    pub const FEASIBLE_NOTE: &str =
        "The time limit was reached; this allocation is not proven optimal.";
}

#[cfg(not(any(feature = "ja", feature = "en")))]
pub mod strings {
    pub const AGENT: &str = "Participant";
    pub const ITEM: &str = "Item";
    pub const KIND: &str = "Kind";
    pub const SHARE: &str = "Share";
    pub const SATISFACTION: &str = "Satisfaction";
    pub const INDIVISIBLE: &str = "indivisible";
    pub const DIVISIBLE: &str = "divisible";
    pub const NOTHING_RECEIVED: &str = "(nothing)";
    pub const NO_SOLUTION_FOUND: &str = "No solution found";
    pub const INVALID_SOLVER_CONFIGURATION: &str = "Invalid solver configuration";
    pub const INCONSISTENT_ASSIGNMENT: &str = "The solver returned an inconsistent allocation";
    pub const FEASIBLE_NOTE: &str =
        "The time limit was reached; this allocation is not proven optimal.";
}

pub use strings::*;

#[cfg(feature = "ja")]
pub fn invalid_input(detail: impl std::fmt::Display) -> String {
    format!("入力が不正です: {detail}")
}

#[cfg(feature = "ja")]
pub fn invalid_request(detail: impl std::fmt::Display) -> String {
    format!("リクエストを読み取れません: {detail}")
}

#[cfg(feature = "en")]
pub fn invalid_input(detail: impl std::fmt::Display) -> String {
    format!("Invalid input: {detail}")
}

#[cfg(feature = "en")]
pub fn invalid_request(detail: impl std::fmt::Display) -> String {
    format!("Could not read request: {detail}")
}

#[cfg(not(any(feature = "ja", feature = "en")))]
pub fn invalid_input(detail: impl std::fmt::Display) -> String {
    format!("Invalid input: {detail}")
}

#[cfg(not(any(feature = "ja", feature = "en")))]
pub fn invalid_request(detail: impl std::fmt::Display) -> String {
    format!("Could not read request: {detail}")
}

/// Headline fairness guarantee for a worst-off percentage.
pub struct WorstGuaranteeMessage<P> {
    percentage: P,
}

pub fn worst_guarantee<P: std::fmt::Display>(percentage: P) -> WorstGuaranteeMessage<P> {
    WorstGuaranteeMessage { percentage }
}

#[cfg(feature = "ja")]
impl<P: std::fmt::Display> std::fmt::Display for WorstGuaranteeMessage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "全員が、自分が全品目に付けた価値の少なくとも {}% を受け取ります。",
            self.percentage
        )
    }
}

#[cfg(feature = "en")]
impl<P: std::fmt::Display> std::fmt::Display for WorstGuaranteeMessage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Every participant receives at least {}% of the value they themselves assigned to all items.",
            self.percentage
        )
    }
}

#[cfg(not(any(feature = "ja", feature = "en")))]
impl<P: std::fmt::Display> std::fmt::Display for WorstGuaranteeMessage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Every participant receives at least {}% of the value they themselves assigned to all items.",
            self.percentage
        )
    }
}
