use crate::config::IntegrationConfig;
use crate::models::{RoleForecast, RoleTrend, ShortageRecord, ShortageSummary, TrendDirection};

/// Compares forecast daily demand with the role's current state.
///
/// The basis is the current daily shortage, or the current actual daily
/// hours when the role is not short.
pub fn classify_trend(
    forecast_daily_demand: f64,
    current: &ShortageRecord,
    config: &IntegrationConfig,
) -> RoleTrend {
    let basis_is_shortage = current.shortage_daily_hours > 0.0;
    let basis = if basis_is_shortage {
        current.shortage_daily_hours
    } else {
        current.actual_daily_hours
    };

    let direction = if forecast_daily_demand > basis * config.trend_increase_factor {
        TrendDirection::Increasing
    } else if forecast_daily_demand < basis * config.trend_decrease_factor {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    RoleTrend {
        role: current.role_name().to_string(),
        direction,
        forecast_daily_demand,
        comparison_basis: basis,
        basis_is_shortage,
    }
}

/// Trends for every role that has a forecast.
pub fn compute_trends(
    summary: &ShortageSummary,
    forecasts: &[RoleForecast],
    config: &IntegrationConfig,
) -> Vec<RoleTrend> {
    forecasts
        .iter()
        .filter_map(|f| {
            summary
                .role(&f.role)
                .map(|record| classify_trend(f.average_daily_demand, record, config))
        })
        .collect()
}
