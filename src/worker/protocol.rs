//! Protocol types for worker communication.
//!
//! One JSON object per line in each direction. Requests carry a unique `id`
//! that the worker echoes back, so several requests may be in flight at once.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "metadata.list_schemas").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Connection Parameters (included in all requests)
// ============================================================================

/// Engine connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Driver name (e.g., "trino").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

// ============================================================================
// Metadata Request Parameters
// ============================================================================

/// Parameters for `metadata.list_catalogs`.
#[derive(Debug, Clone, Serialize)]
pub struct ListCatalogsParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

/// Parameters for `metadata.list_schemas`.
#[derive(Debug, Clone, Serialize)]
pub struct ListSchemasParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub catalog: String,
}

/// Parameters for `metadata.list_tables`.
#[derive(Debug, Clone, Serialize)]
pub struct ListTablesParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub catalog: String,
    pub schema: String,
}

/// Parameters for `metadata.describe_columns`.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeColumnsParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

// ============================================================================
// Query Execution Parameters
// ============================================================================

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Positional placeholder values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<serde_json::Value>>,
}

// ============================================================================
// Metadata Response Types
// ============================================================================

/// Response from `metadata.list_catalogs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCatalogsResponse {
    pub catalogs: Vec<String>,
}

/// Response from `metadata.list_schemas`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListSchemasResponse {
    pub schemas: Vec<String>,
}

/// Response from `metadata.list_tables`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesResponse {
    pub tables: Vec<String>,
}

/// Column information from `DESCRIBE`.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Engine-native type name.
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Response from `metadata.describe_columns`.
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeColumnsResponse {
    pub columns: Vec<ColumnInfo>,
}

// ============================================================================
// Query Execution Response Types
// ============================================================================

/// Column information in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Engine-native type.
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Result column descriptions.
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows, positionally aligned with `columns`.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    pub row_count: i64,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const LIST_CATALOGS: &str = "metadata.list_catalogs";
    pub const LIST_SCHEMAS: &str = "metadata.list_schemas";
    pub const LIST_TABLES: &str = "metadata.list_tables";
    pub const DESCRIBE_COLUMNS: &str = "metadata.describe_columns";
    pub const EXECUTE_QUERY: &str = "query.execute";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ConnectionParams {
        ConnectionParams {
            driver: "trino".to_string(),
            connection_string: "http://localhost:8080".to_string(),
        }
    }

    #[test]
    fn test_connection_is_flattened() {
        let params = ListTablesParams {
            connection: connection(),
            catalog: "hive".to_string(),
            schema: "sales".to_string(),
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["driver"], "trino");
        assert_eq!(json["catalog"], "hive");
        assert_eq!(json["schema"], "sales");
    }

    #[test]
    fn test_execute_params_omit_missing_args() {
        let params = ExecuteQueryParams {
            connection: connection(),
            sql: "SELECT 1".to_string(),
            args: None,
        };

        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("args"));
    }

    #[test]
    fn test_describe_response() {
        let json = r#"{"columns": [{"name": "id", "type": "bigint"}]}"#;
        let response: DescribeColumnsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.columns[0].name, "id");
        assert_eq!(response.columns[0].data_type, "bigint");
    }
}
