mod activity;
mod canvas;
mod palette;
mod top;
