//! Tests for the Slack client.




#[cfg(test)]
mod rtm_tests;
