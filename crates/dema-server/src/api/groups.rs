use std::collections::{BTreeMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use dema_catalog::{
    build_facets, search_groups, suggest, ActiveFilters, FacetDimension, FacetOption,
    FlatVariant, GroupQuery, SearchSuggestion,
};
use dema_core::ProductGroup;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct GroupList {
    total: usize,
    groups: Vec<ProductGroup>,
}

/// Parsed listing parameters. Any key other than `search`, `catalog` and
/// `limit` names a facet dimension; its value may list several options
/// separated by commas.
#[derive(Debug, Default)]
pub(super) struct ListParams {
    pub(super) query: GroupQuery,
    pub(super) limit: Option<usize>,
}

pub(super) fn parse_list_params(params: Vec<(String, String)>) -> Result<ListParams, String> {
    let mut parsed = ListParams::default();
    for (key, value) in params {
        match key.as_str() {
            "search" | "q" => parsed.query.search = Some(value),
            "catalog" => parsed.query.catalog = Some(value),
            "limit" => {
                let limit = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid limit \"{value}\""))?;
                parsed.limit = Some(limit);
            }
            other => {
                let dimension: FacetDimension = other.parse().map_err(|e| format!("{e}"))?;
                for option in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                    parsed.query.filters.select(dimension, option);
                }
            }
        }
    }
    Ok(parsed)
}

pub(super) async fn list_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<GroupList>>, ApiError> {
    let params = parse_list_params(params)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let found = search_groups(state.catalog.groups(), &params.query);
    let data = GroupList {
        total: found.len(),
        groups: found
            .into_iter()
            .take(normalize_limit(params.limit))
            .cloned()
            .collect(),
    };

    Ok(ApiResponse::new(data, req_id))
}

pub(super) async fn get_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group_id): Path<String>,
) -> Result<Json<ApiResponse<ProductGroup>>, ApiError> {
    let group = state.catalog.group(&group_id).cloned().ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("product group '{group_id}' not found"),
        )
    })?;

    Ok(ApiResponse::new(group, req_id))
}

/// Facets over the variants of the groups matching `search`/`catalog`,
/// narrowed by the active facet filters.
pub(super) async fn list_facets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<BTreeMap<FacetDimension, Vec<FacetOption>>>>, ApiError> {
    let params = parse_list_params(params)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let text_only = GroupQuery {
        filters: ActiveFilters::new(),
        ..params.query.clone()
    };
    let matching: HashSet<&str> = search_groups(state.catalog.groups(), &text_only)
        .into_iter()
        .map(|g| g.group_id.as_str())
        .collect();
    let visible: Vec<FlatVariant> = state
        .catalog
        .variants()
        .iter()
        .filter(|v| matching.contains(v.group_id.as_str()) && params.query.filters.matches(v))
        .cloned()
        .collect();

    Ok(ApiResponse::new(build_facets(&visible), req_id))
}

#[derive(Debug, Deserialize)]
pub(super) struct SuggestQuery {
    #[serde(default)]
    q: String,
}

pub(super) async fn list_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SuggestQuery>,
) -> Json<ApiResponse<Vec<SearchSuggestion>>> {
    ApiResponse::new(suggest(state.catalog.variants(), &query.q), req_id)
}
