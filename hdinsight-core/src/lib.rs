//! HDInsight Core
//!
//! Declarative value model, provider trait and attribute schemas shared by
//! the HDInsight resource provider and its command line driver.

pub mod provider;
pub mod resource;
pub mod schema;
