mod common;
mod dashboards;
