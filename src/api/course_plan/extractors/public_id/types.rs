/*
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - decode ロジック / extractor 実装は core.rs
 */
use super::core::PublicId;

// course plans
pub enum PlanTag {}
pub type PublicPlanId = PublicId<PlanTag>;
