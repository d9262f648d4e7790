/// Blocking, user-facing notice for failures the app cannot recover from.
pub trait UserAlert {
    fn alert(&mut self, message: &str);
}
