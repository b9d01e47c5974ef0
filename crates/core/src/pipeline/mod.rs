pub mod infrastructure;
pub mod pipeline_executor;
pub mod pipeline_logger;
pub mod render_dailies_use_case;

#[cfg(test)]
pub(crate) mod test_support;
