//! Report generation port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::QuantfolioError;
use crate::domain::rebalance::RebalancePlan;

/// Port for writing analysis and rebalancing reports.
pub trait ReportPort {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &str,
    ) -> Result<(), QuantfolioError>;

    fn write_rebalance(
        &self,
        plan: &RebalancePlan,
        output_path: &str,
    ) -> Result<(), QuantfolioError>;
}
