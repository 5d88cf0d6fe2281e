// src/services/analyzer.rs

//! Analyzer collaborator boundary.
//!
//! The expensive semantic analysis is strictly an injected capability:
//! the scheduler calls it at most once per unique cluster and never
//! assumes a concrete implementation exists. Two offline implementations
//! ship with the crate.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ClusterAnalysis, InferredDataModel, NetworkExchange, ResponseBody};

/// Cluster-level analysis failure. Non-fatal: the record keeps going
/// without inferred models.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("analyzer returned a malformed result: {0}")]
    Malformed(String),
}

/// A collaborator that turns one representative page plus its captured
/// exchanges into an inferred data model.
#[async_trait]
pub trait ClusterAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        markup: &str,
        exchanges: &[NetworkExchange],
    ) -> Result<ClusterAnalysis, AnalyzeError>;
}

/// Analyzer-disabled mode: returns an empty analysis.
pub struct NoopAnalyzer;

#[async_trait]
impl ClusterAnalyzer for NoopAnalyzer {
    async fn analyze(
        &self,
        _markup: &str,
        _exchanges: &[NetworkExchange],
    ) -> Result<ClusterAnalysis, AnalyzeError> {
        Ok(ClusterAnalysis::default())
    }
}

/// Offline classifier: infers the page type from markup signals and
/// data entities from structured API responses, without any model call.
pub struct HeuristicAnalyzer;

#[async_trait]
impl ClusterAnalyzer for HeuristicAnalyzer {
    async fn analyze(
        &self,
        markup: &str,
        exchanges: &[NetworkExchange],
    ) -> Result<ClusterAnalysis, AnalyzeError> {
        Ok(ClusterAnalysis {
            page_type: classify_page(markup),
            data_models: infer_api_models(exchanges),
        })
    }
}

fn classify_page(markup: &str) -> String {
    let lower = markup.to_lowercase();

    if lower.contains("login") || lower.contains("sign in") {
        "Authentication - Login"
    } else if lower.contains("product") && (lower.contains("buy") || lower.contains("cart")) {
        "E-Commerce - Product Detail"
    } else if lower.contains("dashboard") {
        "Dashboard - Overview"
    } else if lower.contains("<form") {
        "Form - Data Entry"
    } else {
        "Content Page"
    }
    .to_string()
}

/// One entity per structured endpoint: the last path segment names it,
/// the top-level object keys are its attributes.
fn infer_api_models(exchanges: &[NetworkExchange]) -> Vec<InferredDataModel> {
    exchanges
        .iter()
        .filter_map(|exchange| {
            let ResponseBody::Structured { value } = &exchange.body else {
                return None;
            };

            let object = value
                .as_object()
                .or_else(|| value.as_array()?.first()?.as_object())?;
            if object.is_empty() {
                return None;
            }

            let entity = exchange
                .path
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or("response")
                .to_string();

            let mut attributes: Vec<String> = object.keys().cloned().collect();
            attributes.sort_unstable();

            Some(InferredDataModel {
                entity,
                attributes,
                source: "api".to_string(),
            })
        })
        .collect()
}
