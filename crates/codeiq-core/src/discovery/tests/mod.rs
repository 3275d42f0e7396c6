mod tests_extension;
