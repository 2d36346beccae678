//! End-to-end relay tests against mocked Slack, Dify and Supabase upstreams

mod common;
mod slack_events;
