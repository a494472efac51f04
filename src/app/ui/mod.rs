mod legend;
mod panels;
