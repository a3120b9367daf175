// Copyright 2024 The SqlJob Client Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use serde_json::json;
use sqljob_client::{MockTransport, QueryOptions, QueryState, SqlJob, SqlJobBuilder};
use tracing_subscriber::EnvFilter;

async fn page_through(job: &Arc<SqlJob>) -> anyhow::Result<()> {
    let mut query = job.query("select * from qiws.qcustcdt", QueryOptions::default());

    let mut resp = query.run(Some(2)).await?;
    println!("First page:{:?}", resp.field("data"));
    while query.state() == QueryState::RunMoreDataAvail {
        resp = query.fetch_more(None).await?;
        println!("Next page:{:?}", resp.field("data"));
    }
    Ok(())
}

async fn failing_query(job: &Arc<SqlJob>) {
    let opts = QueryOptions::default().parameters(vec![json!("X")]);
    let mut query = job.query("select * from missing where a = ?", opts);
    match query.run(None).await {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Query failed as expected:{e}, state:{}", query.state()),
    }
}

async fn cl_command(job: &Arc<SqlJob>) -> anyhow::Result<()> {
    let opts = QueryOptions::default().cl_command(true).terse_results(true);
    let mut query = job.query("CRTLIB LIB(DEMO)", opts);
    let resp = query.run(None).await?;
    println!("CL command result:{:?}, state:{}", resp.field("data"), query.state());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // Replies of a server, scripted in dispatch order.
    let transport = Arc::new(MockTransport::new());
    transport.push_json(json!({"id": "query1", "success": true, "is_done": false, "data": [{"CUSNUM": 938472}, {"CUSNUM": 839283}]}));
    transport.push_json(json!({"id": "fetchMore2", "success": true, "is_done": true, "data": [{"CUSNUM": 392859}]}));
    transport.push_json(json!({"id": "query3", "success": false, "sql_state": "42704", "sql_rc": -204}));
    transport.push_json(json!({"id": "clcommand4", "success": true, "is_done": true, "data": []}));

    let job = SqlJobBuilder::new(transport).default_rows_to_fetch(2).build()?;

    println!("------------------------------------------------------------------");
    println!("### page through:");
    page_through(&job).await?;

    println!("------------------------------------------------------------------");
    println!("### failing query:");
    failing_query(&job).await;

    println!("------------------------------------------------------------------");
    println!("### cl command:");
    cl_command(&job).await?;

    println!("Queries still tracked:{}", job.registry().len());
    Ok(())
}
