mod discord_tests;
