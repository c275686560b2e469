//! Tests for the issuance engine.


mod batch_tests;
