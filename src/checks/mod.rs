//! Built-in reusable checks.
//!
//! Every check here implements [`Check`](crate::core::Check) and carries its
//! own default message template and format arguments, which the message
//! resolver uses when no override applies.

mod compare;
mod length;
mod pattern;
mod predicate;
mod presence;
mod range;

pub use compare::{Compare, Equal};
pub use length::{Length, MaxLength, MinLength};
pub use pattern::Pattern;
pub use predicate::Predicate;
pub use presence::{NotEmpty, Required};
pub use range::Range;

#[cfg(test)]
pub(crate) mod testing {
    use crate::core::{CheckContext, Member, Model};
    use crate::model;

    pub(crate) struct Probe {
        pub(crate) secret: String,
        pub(crate) confirm: String,
    }

    model! {
        Probe {
            fields: [secret, confirm],
        }
    }

    pub(crate) fn with_probe(secret: &str, confirm: &str, run: impl FnOnce(&CheckContext<'_>)) {
        let probe = Probe {
            secret: secret.to_string(),
            confirm: confirm.to_string(),
        };
        let member = Member::new(Probe::describe(), "secret");
        let context = CheckContext {
            instance: &probe,
            member: &member,
        };
        run(&context);
    }

    pub(crate) fn with_context(run: impl FnOnce(&CheckContext<'_>)) {
        with_probe("", "", run);
    }
}
