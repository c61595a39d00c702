//! [`Releasable`] and [`MaybeReleasable`] implementations for std and tokio types.

use std::collections::VecDeque;
use std::sync::Arc;

use variadics_please::all_tuples;

use super::{MaybeReleasable, Releasable, ReleaseHandle, ReleaseIdentity};
use crate::error::ReleaseError;

// ─────────────────────────────────────────────────────────────────────────────
// Releasable values
// ─────────────────────────────────────────────────────────────────────────────

impl<T: Releasable> MaybeReleasable for Arc<T> {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        Some(Arc::clone(self) as ReleaseHandle)
    }
}

impl MaybeReleasable for Arc<dyn Releasable> {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        Some(Arc::clone(self))
    }
}

/// Releasing an abort handle aborts the task it points to.
///
/// Every handle to the same task shares the task's identity.
impl Releasable for tokio::task::AbortHandle {
    fn release(&self) -> Result<(), ReleaseError> {
        self.abort();
        Ok(())
    }

    fn identity(&self) -> Option<ReleaseIdentity> {
        Some(ReleaseIdentity::Task(self.id()))
    }
}

impl MaybeReleasable for tokio::task::AbortHandle {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        Some(Arc::new(self.clone()))
    }
}

/// A spawned task is releasable through its abort handle.
impl<T> MaybeReleasable for tokio::task::JoinHandle<T> {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        Some(Arc::new(self.abort_handle()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delegating wrappers
// ─────────────────────────────────────────────────────────────────────────────

impl<T: MaybeReleasable + ?Sized> MaybeReleasable for Box<T> {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        (**self).as_releasable()
    }

    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        (**self).as_sequence()
    }
}

impl<T: MaybeReleasable + ?Sized> MaybeReleasable for &T {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        (**self).as_releasable()
    }

    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        (**self).as_sequence()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequences
// ─────────────────────────────────────────────────────────────────────────────

impl<T: MaybeReleasable> MaybeReleasable for [T] {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        Some(self.iter().map(|item| item as &dyn MaybeReleasable).collect())
    }
}

impl<T: MaybeReleasable, const N: usize> MaybeReleasable for [T; N] {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        self.as_slice().as_sequence()
    }
}

impl<T: MaybeReleasable> MaybeReleasable for Vec<T> {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        self.as_slice().as_sequence()
    }
}

impl<T: MaybeReleasable> MaybeReleasable for VecDeque<T> {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        Some(self.iter().map(|item| item as &dyn MaybeReleasable).collect())
    }
}

/// `Some(v)` is a one-element sequence, `None` an empty one.
impl<T: MaybeReleasable> MaybeReleasable for Option<T> {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        Some(
            self.iter()
                .map(|item| item as &dyn MaybeReleasable)
                .collect(),
        )
    }
}

/// `Ok(v)` is a one-element sequence, `Err(_)` an empty one.
impl<T: MaybeReleasable, E> MaybeReleasable for Result<T, E> {
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        Some(
            self.iter()
                .map(|item| item as &dyn MaybeReleasable)
                .collect(),
        )
    }
}

// Tuples are heterogeneous sequences.
macro_rules! impl_maybe_releasable_tuple {
    ($($item:ident),*) => {
        impl<$($item: MaybeReleasable),*> MaybeReleasable for ($($item,)*) {
            fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
                #[expect(non_snake_case, reason = "tuple fields are bound by their type parameter names")]
                let ($($item,)*) = self;
                Some(vec![$($item as &dyn MaybeReleasable),*])
            }
        }
    };
}

// Generate impls for tuples of size 1 to 12
all_tuples!(impl_maybe_releasable_tuple, 1, 12, T);

// ─────────────────────────────────────────────────────────────────────────────
// Opaque values
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {
        $(impl MaybeReleasable for $ty {})*
    };
}

impl_opaque!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    str,
    String,
    std::time::Duration,
    std::time::Instant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releasable::{handle_identity, releasables_in};

    #[tokio::test]
    async fn join_handle_release_aborts_task() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });

        let handles = releasables_in(&handle);
        assert_eq!(handles.len(), 1);
        handles[0].release().unwrap();

        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn task_handles_share_the_task_identity() {
        let handle = tokio::spawn(std::future::pending::<()>());
        let abort = handle.abort_handle();

        let from_join = releasables_in(&handle).remove(0);
        let from_abort = releasables_in(&abort).remove(0);
        let again = releasables_in(&abort).remove(0);

        assert_eq!(handle_identity(&from_join), ReleaseIdentity::Task(handle.id()));
        assert_eq!(handle_identity(&from_abort), handle_identity(&from_join));
        assert_eq!(handle_identity(&again), handle_identity(&from_abort));
        abort.abort();
    }

    #[test]
    fn arrays_and_deques_are_sequences() {
        let array = [Arc::new(Noop), Arc::new(Noop)];
        assert_eq!(releasables_in(&array).len(), 2);

        let deque: VecDeque<Arc<Noop>> = VecDeque::from(vec![Arc::new(Noop)]);
        assert_eq!(releasables_in(&deque).len(), 1);
    }

    #[test]
    fn result_ok_is_spread_and_err_is_empty() {
        let ok: Result<Arc<Noop>, String> = Ok(Arc::new(Noop));
        let err: Result<Arc<Noop>, String> = Err("boom".into());
        assert_eq!(releasables_in(&ok).len(), 1);
        assert!(releasables_in(&err).is_empty());
    }

    #[test]
    fn boxed_values_delegate() {
        let boxed: Box<dyn MaybeReleasable> = Box::new(Arc::new(Noop));
        assert_eq!(releasables_in(&boxed).len(), 1);

        let boxed_seq: Box<dyn MaybeReleasable> = Box::new(vec![Arc::new(Noop)]);
        assert_eq!(releasables_in(&boxed_seq).len(), 1);
    }

    struct Noop;

    impl Releasable for Noop {
        fn release(&self) -> Result<(), ReleaseError> {
            Ok(())
        }
    }
}
