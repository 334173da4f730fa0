use crate::schema::{FieldType, SchemaField, TableSpec};

/// One row per trading day: signal counts, trade tallies and the day's P&L,
/// written once by the pipeline after the close.
pub fn daily_summary() -> TableSpec {
    TableSpec {
        name: "daily_summary".to_string(),
        fields: vec![
            SchemaField::required("date", FieldType::Date),
            SchemaField::required("strategy", FieldType::String).with_default("'MACD_Momentum'"),
            SchemaField::required("trading_day", FieldType::String),
            SchemaField::required("spx_bars_count", FieldType::Integer),
            SchemaField::required("entry_signals", FieldType::Integer),
            SchemaField::required("exit_signals", FieldType::Integer),
            SchemaField::required("total_trades", FieldType::Integer),
            SchemaField::required("winning_trades", FieldType::Integer),
            SchemaField::required("losing_trades", FieldType::Integer),
            SchemaField::required("win_rate", FieldType::Float),
            SchemaField::required("total_profit", FieldType::Float),
            SchemaField::required("total_loss", FieldType::Float),
            SchemaField::required("net_pnl", FieldType::Float),
            SchemaField::nullable("average_win", FieldType::Float),
            SchemaField::nullable("average_loss", FieldType::Float),
            SchemaField::required("api_requests_made", FieldType::Integer),
            SchemaField::nullable("execution_time_seconds", FieldType::Float),
            SchemaField::nullable("market_open_spx", FieldType::Float),
            SchemaField::nullable("market_close_spx", FieldType::Float),
            SchemaField::nullable("spx_daily_change", FieldType::Float),
            SchemaField::nullable("spx_daily_change_percent", FieldType::Float),
            SchemaField::nullable("created_at", FieldType::Timestamp)
                .with_default("CURRENT_TIMESTAMP()"),
            SchemaField::nullable("cloud_function_version", FieldType::String),
            SchemaField::nullable("error_message", FieldType::String),
        ],
        partition_field: Some("date".to_string()),
        cluster_fields: vec!["date".to_string(), "strategy".to_string()],
    }
}

/// One row per executed trade. Exit columns stay NULL for positions that were
/// never closed by the strategy.
pub fn trades() -> TableSpec {
    TableSpec {
        name: "trades".to_string(),
        fields: vec![
            SchemaField::required("date", FieldType::Date),
            SchemaField::required("trade_id", FieldType::String),
            SchemaField::required("symbol", FieldType::String),
            SchemaField::required("strike_price", FieldType::Integer),
            SchemaField::required("entry_time", FieldType::Timestamp),
            SchemaField::required("entry_time_est", FieldType::String),
            SchemaField::required("entry_price", FieldType::Float),
            SchemaField::required("entry_spx_price", FieldType::Float),
            SchemaField::required("entry_macd", FieldType::Float),
            SchemaField::required("entry_signal", FieldType::Float),
            SchemaField::required("entry_histogram", FieldType::Float),
            SchemaField::nullable("exit_time", FieldType::Timestamp),
            SchemaField::nullable("exit_time_est", FieldType::String),
            SchemaField::nullable("exit_price", FieldType::Float),
            SchemaField::nullable("exit_spx_price", FieldType::Float),
            SchemaField::nullable("exit_macd", FieldType::Float),
            SchemaField::nullable("exit_signal", FieldType::Float),
            SchemaField::nullable("exit_histogram", FieldType::Float),
            SchemaField::nullable("hold_duration_minutes", FieldType::Integer),
            SchemaField::required("pnl", FieldType::Float),
            SchemaField::required("pnl_percent", FieldType::Float),
            SchemaField::required("exit_reason", FieldType::String),
            SchemaField::required("is_winner", FieldType::Boolean),
            SchemaField::required("trade_sequence", FieldType::Integer),
            SchemaField::nullable("created_at", FieldType::Timestamp)
                .with_default("CURRENT_TIMESTAMP()"),
        ],
        partition_field: Some("date".to_string()),
        cluster_fields: vec![
            "date".to_string(),
            "symbol".to_string(),
            "trade_sequence".to_string(),
        ],
    }
}

/// Intraday SPX price samples kept for later replay and analysis.
pub fn market_data_archive() -> TableSpec {
    TableSpec {
        name: "market_data_archive".to_string(),
        fields: vec![
            SchemaField::required("date", FieldType::Date),
            SchemaField::required("timestamp", FieldType::Timestamp),
            SchemaField::required("spx_price", FieldType::Float),
            SchemaField::nullable("spx_open", FieldType::Float),
            SchemaField::nullable("spx_high", FieldType::Float),
            SchemaField::nullable("spx_low", FieldType::Float),
            SchemaField::nullable("volume", FieldType::Integer),
            SchemaField::nullable("created_at", FieldType::Timestamp)
                .with_default("CURRENT_TIMESTAMP()"),
        ],
        partition_field: Some("date".to_string()),
        cluster_fields: vec!["date".to_string(), "timestamp".to_string()],
    }
}

/// All tables, in provisioning order.
pub fn all_tables() -> Vec<TableSpec> {
    vec![daily_summary(), trades(), market_data_archive()]
}
