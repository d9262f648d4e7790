/// Single line of text telling the user what the loop currently sees.
pub trait StatusDisplay: Send {
    fn set_status(&mut self, text: &str);
}
