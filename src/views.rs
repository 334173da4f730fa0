/// A named reporting query. Views carry no schema of their own; the warehouse
/// derives one from the query text.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub name: String,
    pub query: String,
}

pub fn daily_performance(project_id: &str, dataset_name: &str) -> ViewSpec {
    ViewSpec {
        name: "daily_performance".to_string(),
        query: format!(
            r#"SELECT
  date,
  net_pnl,
  win_rate,
  total_trades,
  spx_daily_change_percent,
  CASE
    WHEN net_pnl > 0 THEN 'Profitable'
    WHEN net_pnl < 0 THEN 'Loss'
    ELSE 'Breakeven'
  END as day_result
FROM `{project_id}.{dataset_name}.daily_summary`
ORDER BY date DESC"#
        ),
    }
}

pub fn monthly_summary(project_id: &str, dataset_name: &str) -> ViewSpec {
    ViewSpec {
        name: "monthly_summary".to_string(),
        query: format!(
            r#"SELECT
  EXTRACT(YEAR FROM date) as year,
  EXTRACT(MONTH FROM date) as month,
  COUNT(*) as trading_days,
  SUM(total_trades) as total_trades,
  SUM(net_pnl) as monthly_pnl,
  AVG(win_rate) as avg_win_rate,
  COUNT(CASE WHEN net_pnl > 0 THEN 1 END) as profitable_days,
  COUNT(CASE WHEN net_pnl < 0 THEN 1 END) as loss_days
FROM `{project_id}.{dataset_name}.daily_summary`
GROUP BY year, month
ORDER BY year DESC, month DESC"#
        ),
    }
}

pub fn strike_performance(project_id: &str, dataset_name: &str) -> ViewSpec {
    ViewSpec {
        name: "strike_performance".to_string(),
        query: format!(
            r#"SELECT
  strike_price,
  COUNT(*) as total_trades,
  SUM(CASE WHEN is_winner THEN 1 ELSE 0 END) as winning_trades,
  SAFE_DIVIDE(SUM(CASE WHEN is_winner THEN 1 ELSE 0 END), COUNT(*)) as win_rate,
  AVG(pnl) as avg_pnl,
  SUM(pnl) as total_pnl,
  AVG(hold_duration_minutes) as avg_hold_minutes
FROM `{project_id}.{dataset_name}.trades`
GROUP BY strike_price
ORDER BY total_trades DESC"#
        ),
    }
}

/// All views, in provisioning order. They read the tables created earlier in
/// the run, so tables must be provisioned first.
pub fn all_views(project_id: &str, dataset_name: &str) -> Vec<ViewSpec> {
    vec![
        daily_performance(project_id, dataset_name),
        monthly_summary(project_id, dataset_name),
        strike_performance(project_id, dataset_name),
    ]
}
