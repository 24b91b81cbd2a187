// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{AncestorRow, Block, BlockRow, Graph, GraphError};

pub const DEFAULT_BASE_URL: &str = "https://api.roamresearch.com";

const BLOCK_QUERY: &str = "[:find ?string ?order \
    :in $ ?uid \
    :where [?b :block/uid ?uid] [?b :block/string ?string] \
    [(get-else $ ?b :block/order 0) ?order]]";

const CHILDREN_QUERY: &str = "[:find ?uid ?string ?order ?parent-uid \
    :in $ [?parent-uid ...] \
    :where [?p :block/uid ?parent-uid] [?p :block/children ?c] \
    [?c :block/uid ?uid] [?c :block/string ?string] \
    [(get-else $ ?c :block/order 0) ?order]]";

const PARENT_QUERY: &str = "[:find ?uid ?string ?order \
    :in $ ?child-uid \
    :where [?c :block/uid ?child-uid] [?p :block/children ?c] \
    [?p :block/uid ?uid] [?p :block/string ?string] \
    [(get-else $ ?p :block/order 0) ?order]]";

const ANCESTOR_QUERY: &str = "[:find ?uid ?string ?order ?distance \
    :in $ ?child-uid % \
    :where [?c :block/uid ?child-uid] (ancestor ?c ?a ?distance) \
    [?a :block/uid ?uid] [?a :block/string ?string] \
    [(get-else $ ?a :block/order 0) ?order]]";

const ANCESTOR_RULES: &str = "[[(ancestor ?c ?a ?d) [?a :block/children ?c] [(ground 1) ?d]] \
    [(ancestor ?c ?a ?d) [?p :block/children ?c] (ancestor ?p ?a ?d0) [(inc ?d0) ?d]]]";

const FIND_PAGE_QUERY: &str = "[:find ?uid \
    :in $ ?ref \
    :where (or-join [?p ?ref] [?p :node/title ?ref] [?p :block/uid ?ref]) \
    [?p :node/title _] [?p :block/uid ?uid]]";

const PAGE_OF_QUERY: &str = "[:find ?page-uid \
    :in $ ?uid \
    :where [?b :block/uid ?uid] [?b :block/page ?p] [?p :block/uid ?page-uid]]";

const STRINGS_QUERY: &str = "[:find ?uid ?string \
    :in $ [?uid ...] \
    :where [?b :block/uid ?uid] [?b :block/string ?string]]";

fn pull_tree_query(depth: usize) -> String {
    format!(
        "[:find (pull ?b [:block/uid :block/string :block/order {{:block/children {depth}}}]) \
         :in $ ?uid :where [?b :block/uid ?uid]]"
    )
}

/// Client for the hosted Roam backend query endpoint.
#[derive(Debug, Clone)]
pub struct RoamGraph {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl RoamGraph {
    pub fn new(
        base_url: &str,
        graph: &str,
        token: impl Into<String>,
    ) -> Result<Self, GraphError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("roamwalk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/graph/{graph}/q", base_url.trim_end_matches('/')),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn q(&self, query: &str, args: Vec<Value>) -> Result<Value, GraphError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            // Survives the backend's cross-host redirect to a graph peer; `Authorization` does not.
            .header("X-Authorization", format!("Bearer {}", self.token))
            .json(&json!({ "query": query, "args": args }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GraphError::Status { status: status.as_u16(), body: error_message(&body) });
        }

        let mut payload: Value = serde_json::from_str(&body)?;
        match payload.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(GraphError::Decode(format!("missing `result` in response: {body}"))),
        }
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        query: &str,
        args: Vec<Value>,
    ) -> Result<Vec<T>, GraphError> {
        let result = self.q(query, args).await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(result)?)
    }
}

/// The backend wraps failures as `{"message": ...}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[async_trait]
impl Graph for RoamGraph {
    async fn block(&self, uid: &str) -> Result<Option<Block>, GraphError> {
        let rows: Vec<(String, i64)> = self.rows(BLOCK_QUERY, vec![json!(uid)]).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|(content, order)| Block { uid: uid.to_owned(), content, order }))
    }

    async fn children_of(&self, parent_uids: &[String]) -> Result<Vec<BlockRow>, GraphError> {
        let rows: Vec<(String, String, i64, String)> =
            self.rows(CHILDREN_QUERY, vec![json!(parent_uids)]).await?;
        Ok(rows
            .into_iter()
            .map(|(uid, content, order, parent_uid)| BlockRow {
                uid,
                content,
                order: Some(order),
                parent_uid: Some(parent_uid),
            })
            .collect())
    }

    async fn pull_tree(
        &self,
        uid: &str,
        depth: usize,
    ) -> Result<Option<Value>, GraphError> {
        let result = self.q(&pull_tree_query(depth), vec![json!(uid)]).await?;
        // `[[{...}]]` for relation finds, `{...}` if the backend unwraps scalars.
        let pulled = match result {
            Value::Array(rows) => rows.into_iter().next().and_then(|row| match row {
                Value::Array(cols) => cols.into_iter().next(),
                other => Some(other),
            }),
            Value::Null => None,
            other => Some(other),
        };
        Ok(pulled.filter(Value::is_object))
    }

    async fn parent_of(&self, uid: &str) -> Result<Option<Block>, GraphError> {
        let rows: Vec<(String, String, i64)> = self.rows(PARENT_QUERY, vec![json!(uid)]).await?;
        Ok(rows.into_iter().next().map(|(uid, content, order)| Block { uid, content, order }))
    }

    async fn ancestors(&self, uid: &str) -> Result<Vec<AncestorRow>, GraphError> {
        let rows: Vec<(String, String, i64, u32)> =
            self.rows(ANCESTOR_QUERY, vec![json!(uid), json!(ANCESTOR_RULES)]).await?;
        Ok(rows
            .into_iter()
            .map(|(uid, content, order, distance)| AncestorRow {
                block: Block { uid, content, order },
                distance,
            })
            .collect())
    }

    async fn find_page(&self, title_or_uid: &str) -> Result<Option<String>, GraphError> {
        let rows: Vec<(String,)> = self.rows(FIND_PAGE_QUERY, vec![json!(title_or_uid)]).await?;
        Ok(rows.into_iter().next().map(|(uid,)| uid))
    }

    async fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        let rows: Vec<(String,)> = self.rows(PAGE_OF_QUERY, vec![json!(uid)]).await?;
        Ok(rows.into_iter().next().map(|(uid,)| uid))
    }

    async fn block_strings(&self, uids: &[String]) -> Result<Vec<(String, String)>, GraphError> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }
        self.rows(STRINGS_QUERY, vec![json!(uids)]).await
    }
}
