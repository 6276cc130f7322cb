#![allow(unused_imports)]

pub use companion_launcher_test_utils::builders;
pub use companion_launcher_test_utils::capture::SharedBuffer;
pub use companion_launcher_test_utils::fake_backend::{FakeBackend, FakeBehaviour, FakeRecorder};
pub use companion_launcher_test_utils::{init_tracing, with_timeout};
