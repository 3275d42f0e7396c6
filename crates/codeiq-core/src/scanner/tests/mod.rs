mod tests_tool;
