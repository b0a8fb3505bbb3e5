//! MCP Server implementation for photo search
//!
//! The tools here are the presentation layer over one
//! [`SearchSessionController`]: each maps to a session operation and answers
//! with the resulting snapshot as JSON.

use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::history::HISTORY_CAP;
use crate::session::{SearchSessionController, SessionSnapshot};
use crate::types::{ContentFilter, SortMode, ViewPatch};

/// The main Photo Search MCP Server
#[derive(Clone)]
pub struct PhotoSearchMcpServer {
    session: SearchSessionController,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// The tag(s) to search for
    #[schemars(description = "Tag or space-separated tags to search the photo feed for")]
    pub term: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ChangeViewParams {
    #[schemars(description = "Sort order: relevance, date-desc, date-asc or interestingness")]
    pub sort_mode: Option<SortMode>,
    #[schemars(description = "Content filter: all, photos-only or screenshots")]
    pub content_filter: Option<ContentFilter>,
    #[schemars(description = "1-based page number; pages past the end show the last page")]
    pub page: Option<usize>,
    #[schemars(description = "Photos per page")]
    pub page_size: Option<usize>,
}

impl From<ChangeViewParams> for ViewPatch {
    fn from(params: ChangeViewParams) -> Self {
        ViewPatch {
            sort_mode: params.sort_mode,
            content_filter: params.content_filter,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PhotoParams {
    #[schemars(description = "Photo id as listed in the current results")]
    pub id: String,
}

/// Snapshot plus the empty-state hint
#[derive(Serialize)]
struct StateResponse<'a> {
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

fn json_result<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn state_result(snapshot: &SessionSnapshot) -> Result<CallToolResult, McpError> {
    json_result(&StateResponse {
        snapshot,
        notice: snapshot.notice(),
    })
}

fn require_term(term: &str) -> Result<&str, McpError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(McpError::invalid_params("search term must not be empty", None));
    }
    Ok(term)
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl PhotoSearchMcpServer {
    pub fn new(config: Config) -> Result<Self> {
        let session = SearchSessionController::from_config(&config)?;
        tracing::info!(
            "Using {} feed transport, history in {}",
            session.feed().transport_name(),
            config.history.dir.display()
        );
        Ok(Self::with_session(session, config))
    }

    /// Serve an already assembled session
    pub fn with_session(session: SearchSessionController, config: Config) -> Self {
        Self {
            session,
            config,
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> &SearchSessionController {
        &self.session
    }

    // ========================================================================
    // Search Tools
    // ========================================================================

    #[tool(description = "Search public photos by tag. Returns the session state with the current page of photos.")]
    async fn search_photos(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let term = require_term(&params.term)?;
        let snapshot = self.session.search(term).await;
        state_result(&snapshot)
    }

    #[tool(description = "Search again for a term from the recent searches list.")]
    async fn select_history_term(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let term = require_term(&params.term)?;
        let snapshot = self.session.select_history_term(term).await;
        state_result(&snapshot)
    }

    // ========================================================================
    // View Tools
    // ========================================================================

    #[tool(description = "Change sorting, content filter or paging of the current results. Does not search again.")]
    async fn change_view(
        &self,
        Parameters(params): Parameters<ChangeViewParams>,
    ) -> Result<CallToolResult, McpError> {
        let snapshot = self.session.change_view(params.into());
        state_result(&snapshot)
    }

    #[tool(description = "Reset sorting and filtering to defaults and go back to the first page.")]
    async fn reset_view(&self) -> Result<CallToolResult, McpError> {
        state_result(&self.session.reset_view())
    }

    #[tool(description = "Get the current session state: status, last query, current page of photos and recent searches.")]
    async fn get_state(&self) -> Result<CallToolResult, McpError> {
        state_result(&self.session.snapshot())
    }

    #[tool(description = "Get full details (description, dates, tags) of a photo from the current results.")]
    async fn get_photo(
        &self,
        Parameters(params): Parameters<PhotoParams>,
    ) -> Result<CallToolResult, McpError> {
        let record = self.session.photo(&params.id).ok_or_else(|| {
            McpError::invalid_params(format!("no photo with id '{}' in current results", params.id), None)
        })?;
        json_result(&record)
    }

    // ========================================================================
    // History Tools
    // ========================================================================

    #[tool(description = "Clear the list of recent searches. Current results are kept.")]
    async fn clear_history(&self) -> Result<CallToolResult, McpError> {
        state_result(&self.session.clear_history())
    }

    #[tool(description = "Get the feed and history configuration.")]
    async fn get_config(&self) -> Result<CallToolResult, McpError> {
        #[derive(Serialize)]
        struct ConfigStatus {
            feed_url: String,
            transport: String,
            history_cap: usize,
            page_size: usize,
            analytics_enabled: bool,
        }

        let status = ConfigStatus {
            feed_url: self.config.feed.base_url.clone(),
            transport: self.session.feed().transport_name().to_string(),
            history_cap: HISTORY_CAP,
            page_size: self.config.view.page_size,
            analytics_enabled: self.session.analytics().is_enabled(),
        };

        json_result(&status)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for PhotoSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Photo Search MCP Server - searches the public photo feed by tag. \
                 Results can be sorted, filtered and paged without searching again, \
                 and the last ten searches are remembered across restarts."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
