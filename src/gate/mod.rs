// SPDX-License-Identifier: GPL-3.0-only
pub mod attempt_log;
pub mod classifier;
pub mod mediator;
pub mod policy;
pub mod risk;
pub mod target;
pub mod validator;

pub use attempt_log::{AttemptLog, AttemptRecord};
pub use mediator::{FetchMediator, FetchResult, RawRequest};
pub use policy::Policy;
pub use risk::RiskAssessment;
