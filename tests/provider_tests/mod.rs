mod anthropic_test;
mod openai_test;
